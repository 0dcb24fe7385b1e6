//! PostgREST client for the Supabase project backing the remote store.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use super::{RemoteError, RemoteResult, RemoteStore};
use crate::models::{
    CanonicalId, DepartmentChanges, NewRemoteDepartment, Profile, RemoteAttendance,
    RemoteDepartment, RemoteEmployee, RemotePayroll,
};

const PAGE_SIZE: usize = 1000;

const DEPARTMENTS: &str = "departments";
const EMPLOYEES: &str = "employees";
const ATTENDANCE: &str = "attendance";
const PAYROLL: &str = "payroll";
const PROFILES: &str = "registration_credentials";

/// Remote store backed by Supabase's PostgREST endpoint.
pub struct PostgrestRemoteStore {
    rest_url: String,
    anon_key: String,
    client: Client,
    access_token: RwLock<Option<String>>,
}

impl PostgrestRemoteStore {
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>) -> RemoteResult<Self> {
        let rest_url = normalize_rest_url(url.as_ref())?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(RemoteError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            rest_url,
            anon_key,
            client: Client::builder().build()?,
            access_token: RwLock::new(None),
        })
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let token = self.access_token.read().await;
        let bearer = token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, format!("{}/{path}", self.rest_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .header("Accept", "application/json")
    }

    /// Fetch every row of a table, one page at a time.
    async fn list_all<T: DeserializeOwned>(&self, table: &str, order: &str) -> RemoteResult<Vec<T>> {
        let mut rows = Vec::new();
        let mut offset = 0usize;

        loop {
            let request = self.request(Method::GET, table).await.query(&[
                ("select", "*".to_string()),
                ("order", order.to_string()),
                ("limit", PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ]);
            let page = send(request).await?.json::<Vec<T>>().await?;
            let fetched = page.len();
            rows.extend(page);

            if fetched < PAGE_SIZE {
                break;
            }
            offset += fetched;
        }

        tracing::debug!("Fetched {} rows from remote {table}", rows.len());
        Ok(rows)
    }

    async fn insert_row<B, T>(&self, table: &str, body: &B) -> RemoteResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, table)
            .await
            .header("Prefer", "return=representation")
            .json(body);
        Ok(send(request).await?.json::<Vec<T>>().await?)
    }

    /// Patch the rows matching `filters`, failing when nothing matched.
    async fn update_rows<B>(&self, table: &str, filters: &[(&str, String)], body: &B) -> RemoteResult<()>
    where
        B: Serialize + ?Sized,
    {
        let query = filters
            .iter()
            .map(|(column, value)| (*column, format!("eq.{value}")))
            .collect::<Vec<_>>();
        let request = self
            .request(Method::PATCH, table)
            .await
            .query(&query)
            .header("Prefer", "return=representation")
            .json(body);
        let updated = send(request).await?.json::<Vec<serde_json::Value>>().await?;

        if updated.is_empty() {
            let described = filters
                .iter()
                .map(|(column, value)| format!("{column}={value}"))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(RemoteError::NotFound(format!("{table} ({described})")));
        }
        Ok(())
    }
}

impl RemoteStore for PostgrestRemoteStore {
    async fn authorize(&self, access_token: &str) {
        *self.access_token.write().await = Some(access_token.to_string());
    }

    async fn provision_schema(&self) -> RemoteResult<()> {
        let request = self
            .request(Method::POST, "rpc/setup_schema")
            .await
            .json(&serde_json::json!({}));
        send(request).await?;
        Ok(())
    }

    async fn list_departments(&self) -> RemoteResult<Vec<RemoteDepartment>> {
        self.list_all(DEPARTMENTS, "name.asc").await
    }

    async fn insert_department(
        &self,
        department: &NewRemoteDepartment,
    ) -> RemoteResult<RemoteDepartment> {
        self.insert_row::<_, RemoteDepartment>(DEPARTMENTS, department)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RemoteError::InvalidPayload(format!(
                    "insert of department '{}' returned no row",
                    department.name
                ))
            })
    }

    async fn update_department(
        &self,
        id: &CanonicalId,
        changes: &DepartmentChanges,
    ) -> RemoteResult<()> {
        self.update_rows(DEPARTMENTS, &[("id", id.as_str())], changes)
            .await
    }

    async fn list_employees(&self) -> RemoteResult<Vec<RemoteEmployee>> {
        self.list_all(EMPLOYEES, "id.asc").await
    }

    async fn insert_employee(&self, employee: &RemoteEmployee) -> RemoteResult<()> {
        self.insert_row::<_, serde_json::Value>(EMPLOYEES, employee)
            .await?;
        Ok(())
    }

    async fn update_employee(&self, employee: &RemoteEmployee) -> RemoteResult<()> {
        self.update_rows(EMPLOYEES, &[("id", employee.id.as_str())], employee)
            .await
    }

    async fn list_attendance(&self) -> RemoteResult<Vec<RemoteAttendance>> {
        self.list_all(ATTENDANCE, "employee_id.asc,date.asc").await
    }

    async fn insert_attendance(&self, entry: &RemoteAttendance) -> RemoteResult<()> {
        self.insert_row::<_, serde_json::Value>(ATTENDANCE, entry)
            .await?;
        Ok(())
    }

    async fn update_attendance(&self, entry: &RemoteAttendance) -> RemoteResult<()> {
        let filters = [
            ("employee_id", entry.employee_id.as_str()),
            ("date", entry.fields.date.to_string()),
        ];
        self.update_rows(ATTENDANCE, &filters, entry).await
    }

    async fn list_payroll(&self) -> RemoteResult<Vec<RemotePayroll>> {
        self.list_all(PAYROLL, "employee_id.asc,period_start.asc,period_end.asc")
            .await
    }

    async fn insert_payroll(&self, record: &RemotePayroll) -> RemoteResult<()> {
        self.insert_row::<_, serde_json::Value>(PAYROLL, record)
            .await?;
        Ok(())
    }

    async fn update_payroll(&self, record: &RemotePayroll) -> RemoteResult<()> {
        let filters = [
            ("employee_id", record.employee_id.as_str()),
            ("period_start", record.fields.period_start.to_string()),
            ("period_end", record.fields.period_end.to_string()),
        ];
        self.update_rows(PAYROLL, &filters, record).await
    }

    async fn find_profile(&self, admin_email: &str) -> RemoteResult<Option<Profile>> {
        let request = self.request(Method::GET, PROFILES).await.query(&[
            ("select", "*".to_string()),
            ("admin_email", format!("eq.{admin_email}")),
            ("limit", "1".to_string()),
        ]);
        let rows = send(request).await?.json::<Vec<Profile>>().await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile(&self, profile: &Profile) -> RemoteResult<()> {
        self.insert_row::<_, serde_json::Value>(PROFILES, &ProfilePayload::from(profile))
            .await?;
        Ok(())
    }

    async fn update_profile(&self, profile: &Profile) -> RemoteResult<()> {
        self.update_rows(
            PROFILES,
            &[("admin_email", profile.admin_email.clone())],
            &ProfilePayload::from(profile),
        )
        .await
    }
}

/// Profile row as written remotely; only registered profiles are replicated.
#[derive(Serialize)]
struct ProfilePayload<'a> {
    #[serde(flatten)]
    profile: &'a Profile,
    is_registered: i64,
}

impl<'a> From<&'a Profile> for ProfilePayload<'a> {
    fn from(profile: &'a Profile) -> Self {
        Self {
            profile,
            is_registered: 1,
        }
    }
}

async fn send(request: RequestBuilder) -> RemoteResult<Response> {
    let response = request.send().await?;
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::from_response(status, &body))
}

/// Normalize a Supabase project URL to its PostgREST base (`.../rest/v1`).
pub fn normalize_rest_url(url: &str) -> RemoteResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(RemoteError::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !crate::util::is_http_url(trimmed) {
        return Err(RemoteError::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }
    if trimmed.ends_with("/rest/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/rest/v1"))
    }
}
