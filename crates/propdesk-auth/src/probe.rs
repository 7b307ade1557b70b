//! Auth verification probe
//!
//! A diagnostic self-check of the auth subsystem's operational readiness:
//! database reachability, session secret configuration, credential-store
//! schema, and user presence. Safe to call repeatedly; the only corrective
//! action it ever takes is creating the missing users table. Seeding an
//! account is left to the operator.

use serde::Serialize;
use tracing::{info, warn};

use propdesk_db::Database;

/// Columns the credential store must expose for login to work
const REQUIRED_USER_COLUMNS: &[&str] = &["id", "name", "email", "password_hash"];

/// A single issue found by the probe
#[derive(Debug, Clone, Serialize)]
pub struct ProbeIssue {
    pub component: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ProbeIssue {
    fn new(component: &str, error: &str) -> Self {
        Self {
            component: component.to_string(),
            error: error.to_string(),
            fix: None,
            details: None,
        }
    }

    fn with_fix(mut self, fix: &str) -> Self {
        self.fix = Some(fix.to_string());
        self
    }

    fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

/// Aggregated result of one probe invocation
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub success: bool,
    pub critical: bool,
    pub issues: Vec<ProbeIssue>,
    /// Corrective actions taken during this invocation
    pub actions: Vec<String>,
}

impl VerificationReport {
    fn from_parts(issues: Vec<ProbeIssue>, actions: Vec<String>) -> Self {
        let critical = issues
            .iter()
            .any(|i| i.component == "database" || i.component == "jwt");
        Self {
            success: issues.is_empty(),
            critical,
            issues,
            actions,
        }
    }
}

/// Verify the auth subsystem end to end and report actionable issues.
///
/// An unreachable database short-circuits the probe: nothing else can be
/// verified without one.
pub async fn verify_auth_system(db: &Database, secret_configured: bool) -> VerificationReport {
    let mut issues = Vec::new();
    let mut actions = Vec::new();

    // 1. Database reachability
    if let Err(e) = db.ping().await {
        issues.push(
            ProbeIssue::new("database", "Database connection failed")
                .with_fix("Check the configured database path and file permissions")
                .with_details(e.to_string()),
        );
        return VerificationReport::from_parts(issues, actions);
    }

    // 2. Session secret configuration
    if !secret_configured {
        issues.push(
            ProbeIssue::new("jwt", "Session secret is not configured").with_fix(
                "Set PROPDESK_SESSION_SECRET or [auth].session_secret in the config file",
            ),
        );
    }

    // 3. Credential store schema
    match db.users_table_exists().await {
        Ok(true) => match db.users_table_columns().await {
            Ok(columns) => {
                let missing: Vec<&str> = REQUIRED_USER_COLUMNS
                    .iter()
                    .filter(|required| !columns.iter().any(|c| c == *required))
                    .copied()
                    .collect();
                if !missing.is_empty() {
                    issues.push(
                        ProbeIssue::new(
                            "schema",
                            &format!("Users table is missing columns: {}", missing.join(", ")),
                        )
                        .with_fix("Recreate the users table or migrate the missing columns"),
                    );
                }
            }
            Err(e) => {
                issues.push(
                    ProbeIssue::new("schema", "Error inspecting users table")
                        .with_details(e.to_string()),
                );
            }
        },
        Ok(false) => match db.create_users_table().await {
            Ok(()) => {
                info!("Verification probe created missing users table");
                actions.push("Created users table with the minimal required schema".to_string());
            }
            Err(e) => {
                issues.push(
                    ProbeIssue::new("schema", "Users table does not exist and could not be created")
                        .with_details(e.to_string()),
                );
            }
        },
        Err(e) => {
            issues.push(
                ProbeIssue::new("schema", "Error checking users table").with_details(e.to_string()),
            );
        }
    }

    // 4. User presence (advisory; never auto-seeded)
    match db.count_users().await {
        Ok(0) => {
            issues.push(
                ProbeIssue::new("users", "No users exist in the database")
                    .with_fix("Register a seed account via POST /api/auth/register"),
            );
        }
        Ok(_) => {}
        Err(e) => {
            issues.push(ProbeIssue::new("users", "Error counting users").with_details(e.to_string()));
        }
    }

    let report = VerificationReport::from_parts(issues, actions);
    if report.critical {
        warn!("Auth verification probe found critical issues: {:?}", report.issues);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use propdesk_db::NewUser;

    async fn test_db() -> Database {
        Database::new_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_fresh_store_reports_missing_users_only() {
        let db = test_db().await;
        let report = verify_auth_system(&db, true).await;

        assert!(!report.success);
        assert!(!report.critical, "zero users is advisory, not critical");
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].component, "users");
        assert!(report.actions.is_empty(), "migrations already created the schema");
    }

    #[tokio::test]
    async fn test_missing_secret_is_critical() {
        let db = test_db().await;
        let report = verify_auth_system(&db, false).await;

        assert!(report.critical);
        assert!(report.issues.iter().any(|i| i.component == "jwt"));
    }

    #[tokio::test]
    async fn test_populated_store_passes() {
        let db = test_db().await;
        db.insert_user(NewUser {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        })
        .await
        .unwrap();

        let report = verify_auth_system(&db, true).await;
        assert!(report.success);
        assert!(!report.critical);
        assert!(report.issues.is_empty());
    }

    #[tokio::test]
    async fn test_probe_is_idempotent() {
        let db = test_db().await;

        let first = verify_auth_system(&db, true).await;
        let second = verify_auth_system(&db, true).await;

        assert_eq!(first.success, second.success);
        assert_eq!(first.issues.len(), second.issues.len());
        // Repair actions must not accumulate across invocations
        assert!(second.actions.is_empty());
    }

    #[tokio::test]
    async fn test_probe_repairs_dropped_table() {
        let db = test_db().await;
        sqlx::query("DROP TABLE users").execute(db.pool()).await.unwrap();

        let report = verify_auth_system(&db, true).await;
        assert_eq!(report.actions.len(), 1);
        assert!(db.users_table_exists().await.unwrap());

        // Second run finds the table it created and takes no further action
        let report = verify_auth_system(&db, true).await;
        assert!(report.actions.is_empty());
    }
}
