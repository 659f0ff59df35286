//! One-time post-start provisioning of the application schema.
//!
//! Once ORDS has installed itself into the database, the application user still needs the SODA
//! privileges and an ORDS-enabled schema before the MongoDB API accepts its credentials. This is
//! done with exactly two administrative operations, in order:
//!
//! 1. `SYSTEM` grants the application user the privileges listed in [`GRANTED_PRIVILEGES`].
//! 2. The application user calls `ORDS.ENABLE_SCHEMA()` on its own schema.
//!
//! Any failure aborts provisioning; nothing is retried.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::constants::{ADMIN_USER, ORACLE_PORT};
use crate::error::{OrdsError, OrdsResult};

/// Privileges the MongoDB API needs on the application schema
pub const GRANTED_PRIVILEGES: &[&str] = &[
    "soda_app",
    "create session",
    "create table",
    "create view",
    "create sequence",
    "create procedure",
    "create job",
    "unlimited tablespace",
];

const MAX_IDENTIFIER_LEN: usize = 128;

/// Credentials and target service of a SQL*Plus session opened inside the database container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlLogin {
    pub user: String,
    pub password: String,
    pub service: String,
}

impl SqlLogin {
    pub fn new(user: impl Into<String>, password: impl Into<String>, service: impl Into<String>) -> Self {
        Self { user: user.into(), password: password.into(), service: service.into() }
    }

    /// EZConnect string as seen from inside the database container
    pub fn connect_string(&self) -> String {
        format!("{}/\"{}\"@//localhost:{}/{}", self.user, self.password, ORACLE_PORT, self.service)
    }
}

/// Raw outcome of a SQL script execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOutput {
    pub exit_code: Option<i64>,
    pub output: String,
}

/// Executes SQL scripts against the database on behalf of the provisioning steps
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlRunner: Send + Sync {
    /// run_script - Run a SQL*Plus script under the given login
    async fn run_script(&self, login: &SqlLogin, script: &str) -> OrdsResult<SqlOutput>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    GrantPrivileges,
    EnableSchema,
}

impl ProvisionStep {
    pub fn name(&self) -> &'static str {
        match self {
            ProvisionStep::GrantPrivileges => "grant privileges",
            ProvisionStep::EnableSchema => "enable schema",
        }
    }

    /// The login the step runs under: SYSTEM for the grant, the application user for its own schema
    pub fn login(&self, user: &str, password: &str, service: &str) -> SqlLogin {
        match self {
            ProvisionStep::GrantPrivileges => SqlLogin::new(ADMIN_USER, password, service),
            ProvisionStep::EnableSchema => SqlLogin::new(user, password, service),
        }
    }

    pub fn statement(&self, user: &str) -> String {
        match self {
            ProvisionStep::GrantPrivileges => format!("grant {} to {}", GRANTED_PRIVILEGES.join(", "), user),
            ProvisionStep::EnableSchema => "begin\n  ORDS.ENABLE_SCHEMA();\nend;".to_string(),
        }
    }

    /// Full SQL*Plus script for the step, stopping at the first SQL or OS error
    pub fn script(&self, user: &str) -> String {
        let statement = self.statement(user);
        let terminator = match self {
            ProvisionStep::GrantPrivileges => ";",
            ProvisionStep::EnableSchema => "\n/",
        };
        format!(
            "whenever sqlerror exit failure\nwhenever oserror exit failure\nset feedback on\n{}{}\nexit success\n",
            statement, terminator
        )
    }
}

/// Runs both provisioning steps in order against the database reachable through `runner`
pub async fn provision_schema<R>(runner: &R, user: &str, password: &str, service: &str) -> OrdsResult<()>
where
    R: SqlRunner + ?Sized,
{
    validate_identifier(user)?;
    validate_password(password)?;

    for step in [ProvisionStep::GrantPrivileges, ProvisionStep::EnableSchema] {
        let login = step.login(user, password, service);
        debug!(step = step.name(), login = %login.user, service = %service, "Running provisioning step");

        let result = runner.run_script(&login, &step.script(user)).await?;
        check_sqlplus_output(step, &result)?;

        info!(step = step.name(), user = %user, "Provisioning step completed");
    }

    Ok(())
}

/// SQL*Plus reports some errors (bad connect string, login failure) without a failing exit code
pub fn check_sqlplus_output(step: ProvisionStep, result: &SqlOutput) -> OrdsResult<()> {
    let reports_error = result.output.lines().map(str::trim_start).any(|line| {
        line.starts_with("ORA-") || line.starts_with("SP2-") || line.starts_with("ERROR at line")
    });

    if result.exit_code != Some(0) || reports_error {
        return Err(OrdsError::Provisioning {
            step: step.name().to_string(),
            exit_code: result.exit_code,
            output: result.output.trim().to_string(),
        });
    }

    Ok(())
}

/// Accepts nonquoted Oracle identifiers only, since the user name is spliced into a GRANT statement
pub fn validate_identifier(identifier: &str) -> OrdsResult<()> {
    let mut chars = identifier.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_is_valid = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#'));

    if !starts_with_letter || !rest_is_valid || identifier.len() > MAX_IDENTIFIER_LEN {
        return Err(OrdsError::InvalidIdentifier(identifier.to_string()));
    }

    Ok(())
}

/// The password ends up quoted inside an EZConnect string
pub fn validate_password(password: &str) -> OrdsResult<()> {
    if password.is_empty() {
        return Err(OrdsError::InvalidCredential("password must not be empty".to_string()));
    }
    if let Some(c) = password.chars().find(|c| matches!(c, '"' | '@' | '/' | '\n' | '\r')) {
        return Err(OrdsError::InvalidCredential(format!("password must not contain {:?}", c)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use mockall::predicate::*;
    use mockall::Sequence;
    use testcontainers::TestcontainersError;
    use rstest::rstest;
    use tracing_test::traced_test;

    fn ok_output() -> OrdsResult<SqlOutput> {
        Ok(SqlOutput { exit_code: Some(0), output: "Grant succeeded.\n".to_string() })
    }

    #[rstest]
    #[case("test")]
    #[case("RACING")]
    #[case("app_user$1")]
    #[case("a#b")]
    fn valid_identifiers_are_accepted(#[case] identifier: &str) {
        assert!(validate_identifier(identifier).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("1test")]
    #[case("_test")]
    #[case("test user")]
    #[case("test; drop user system")]
    #[case("\"quoted\"")]
    #[case("tést")]
    fn invalid_identifiers_are_rejected(#[case] identifier: &str) {
        assert_matches!(validate_identifier(identifier), Err(OrdsError::InvalidIdentifier(_)));
    }

    #[test]
    fn overlong_identifier_is_rejected() {
        let identifier = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert_matches!(validate_identifier(&identifier), Err(OrdsError::InvalidIdentifier(_)));
        assert!(validate_identifier(&"a".repeat(MAX_IDENTIFIER_LEN)).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("pa\"ss")]
    #[case("pa@ss")]
    #[case("pa/ss")]
    #[case("pa\nss")]
    fn invalid_passwords_are_rejected(#[case] password: &str) {
        assert_matches!(validate_password(password), Err(OrdsError::InvalidCredential(_)));
    }

    #[test]
    fn connect_string_quotes_password_and_targets_local_listener() {
        let login = SqlLogin::new("SYSTEM", "s3cr#t", "XEPDB1");
        assert_eq!(login.connect_string(), "SYSTEM/\"s3cr#t\"@//localhost:1521/XEPDB1");
    }

    #[test]
    fn grant_statement_lists_all_privileges_for_user() {
        assert_eq!(
            ProvisionStep::GrantPrivileges.statement("test"),
            "grant soda_app, create session, create table, create view, create sequence, create procedure, \
             create job, unlimited tablespace to test"
        );
    }

    #[test]
    fn scripts_stop_on_first_error() {
        let grant = ProvisionStep::GrantPrivileges.script("test");
        assert!(grant.starts_with("whenever sqlerror exit failure\nwhenever oserror exit failure\n"));
        assert!(grant.contains("unlimited tablespace to test;\n"));
        assert!(grant.ends_with("exit success\n"));

        let enable = ProvisionStep::EnableSchema.script("test");
        assert!(enable.contains("ORDS.ENABLE_SCHEMA();\nend;\n/\n"));
    }

    #[test]
    fn steps_run_under_expected_logins() {
        let grant = ProvisionStep::GrantPrivileges.login("test", "pw", "XEPDB1");
        assert_eq!(grant, SqlLogin::new("SYSTEM", "pw", "XEPDB1"));

        let enable = ProvisionStep::EnableSchema.login("test", "pw", "XEPDB1");
        assert_eq!(enable, SqlLogin::new("test", "pw", "XEPDB1"));
    }

    #[rstest]
    #[case(Some(1), "")]
    #[case(None, "")]
    #[case(Some(0), "ERROR:\nORA-01017: invalid username/password; logon denied\n")]
    #[case(Some(0), "SP2-0306: Invalid option.\n")]
    #[case(Some(0), "ERROR at line 1:\nORA-06550: line 2, column 3:\n")]
    fn failing_sqlplus_output_is_reported(#[case] exit_code: Option<i64>, #[case] output: &str) {
        let result = SqlOutput { exit_code, output: output.to_string() };
        assert_matches!(
            check_sqlplus_output(ProvisionStep::EnableSchema, &result),
            Err(OrdsError::Provisioning { step, exit_code: code, .. }) if step == "enable schema" && code == exit_code
        );
    }

    #[test]
    fn successful_sqlplus_output_passes() {
        let result = SqlOutput { exit_code: Some(0), output: "\nPL/SQL procedure successfully completed.\n".to_string() };
        assert!(check_sqlplus_output(ProvisionStep::EnableSchema, &result).is_ok());
    }

    #[tokio::test]
    #[traced_test]
    async fn provisioning_grants_before_enabling_schema() {
        let mut runner = MockSqlRunner::new();
        let mut seq = Sequence::new();

        runner
            .expect_run_script()
            .withf(|login, script| login.user == "SYSTEM" && script.contains("grant soda_app"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| ok_output());
        runner
            .expect_run_script()
            .withf(|login, script| login.user == "test" && script.contains("ORDS.ENABLE_SCHEMA()"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(SqlOutput { exit_code: Some(0), output: "PL/SQL procedure successfully completed.".into() }));

        provision_schema(&runner, "test", "test", "XEPDB1").await.unwrap();
        assert!(logs_contain("Provisioning step completed"));
    }

    #[tokio::test]
    async fn failed_grant_aborts_before_enabling_schema() {
        let mut runner = MockSqlRunner::new();
        runner
            .expect_run_script()
            .with(eq(SqlLogin::new("SYSTEM", "test", "XEPDB1")), always())
            .times(1)
            .returning(|_, _| Ok(SqlOutput { exit_code: Some(1), output: "ORA-01031: insufficient privileges".into() }));

        let err = provision_schema(&runner, "test", "test", "XEPDB1").await.unwrap_err();
        assert_matches!(err, OrdsError::Provisioning { step, .. } if step == "grant privileges");
    }

    #[tokio::test]
    async fn runner_errors_propagate() {
        let mut runner = MockSqlRunner::new();
        runner
            .expect_run_script()
            .times(1)
            .returning(|_, _| Err(OrdsError::Container(TestcontainersError::other("exec failed"))));

        assert_matches!(provision_schema(&runner, "test", "test", "XEPDB1").await, Err(OrdsError::Container(_)));
    }

    #[tokio::test]
    async fn invalid_user_is_rejected_before_any_sql_runs() {
        let mut runner = MockSqlRunner::new();
        runner.expect_run_script().never();

        assert_matches!(
            provision_schema(&runner, "test to public;--", "test", "XEPDB1").await,
            Err(OrdsError::InvalidIdentifier(_))
        );
    }
}
