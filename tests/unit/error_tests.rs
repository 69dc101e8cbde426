//! Unit tests for `AppError` display formats and conversions.

use revq::AppError;

#[test]
fn display_prefixes_are_stable() {
    let cases = [
        (AppError::Config("x".into()), "config:"),
        (AppError::Db("x".into()), "db:"),
        (AppError::Slack("x".into()), "slack:"),
        (AppError::InvalidUrl("x".into()), "invalid url:"),
        (AppError::UnsupportedHost("x".into()), "unsupported host:"),
        (AppError::DuplicateTask("x".into()), "duplicate task:"),
        (AppError::NotFound("x".into()), "not found:"),
        (
            AppError::InvalidCronSyntax("x".into()),
            "invalid cron syntax:",
        ),
        (
            AppError::InvalidCronField("x".into()),
            "invalid cron field:",
        ),
        (AppError::Io("x".into()), "io:"),
    ];

    for (error, prefix) in cases {
        assert!(
            error.to_string().starts_with(prefix),
            "{error} should start with {prefix}"
        );
    }
}

#[test]
fn messages_have_no_trailing_period() {
    let err = AppError::NotFound("no task at position 9".into());
    assert!(!err.to_string().ends_with('.'));
}

#[test]
fn cron_error_kinds_are_distinct() {
    let syntax = AppError::InvalidCronSyntax("bad".into());
    let field = AppError::InvalidCronField("bad".into());
    assert_ne!(syntax.to_string(), field.to_string());
}

#[test]
fn sqlx_errors_convert_to_db() {
    let err = AppError::from(sqlx::Error::RowNotFound);
    assert!(matches!(err, AppError::Db(_)));
}

#[test]
fn implements_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(AppError::Io("disk gone".into()));
    assert_eq!(err.to_string(), "io: disk gone");
}
