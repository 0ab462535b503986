mod test_utils {
    use std::fs;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const TRANSACTIONS_BODY: &str = r#"[
        {"id": "t-2", "description": "Salary", "amount": 2500.0, "category": "Income", "date": "2024-03-02"},
        {"id": "t-1", "description": "Coffee", "amount": -4.5, "category": "Food", "date": "2024-03-01"}
    ]"#;

    pub async fn backend_with_expected_calls(user_id: &str, expected: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/users/{user_id}/transactions")))
            .respond_with(ResponseTemplate::new(200).set_body_string(TRANSACTIONS_BODY))
            .expect(expected)
            .mount(&mock_server)
            .await;
        mock_server
    }

    pub fn write_config(
        backend_url: Option<&str>,
        rates_url: Option<&str>,
        ttl_ms: u64,
        data_path: &std::path::Path,
    ) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");

        let mut providers = String::new();
        if backend_url.is_some() || rates_url.is_some() {
            providers.push_str("providers:\n");
            if let Some(url) = backend_url {
                providers.push_str(&format!("  transactions:\n    base_url: {url}\n"));
            }
            if let Some(url) = rates_url {
                providers.push_str(&format!("  rates:\n    base_url: {url}\n"));
            }
        }

        let config_content = format!(
            r#"
{providers}
currency: "VND"
cache:
  ttl_ms: {ttl_ms}
  fetch_timeout_ms: 2000
data_path: "{}"
"#,
            data_path.display()
        );
        fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_show_fetches_once_within_ttl_across_sessions() {
    let backend = test_utils::backend_with_expected_calls("u1", 1).await;
    let data_dir = tempfile::tempdir().unwrap();
    let config =
        test_utils::write_config(Some(&backend.uri()), None, 300_000, data_dir.path());
    let config_path = config.path().to_str().unwrap();

    // First invocation fetches and persists.
    finsync::run_command(
        finsync::AppCommand::Show {
            user_id: "u1".to_string(),
        },
        Some(config_path),
    )
    .await
    .expect("First show should succeed");

    // A second invocation is a new session over the same data dir: the
    // persisted record is restored and served without another fetch.
    finsync::run_command(
        finsync::AppCommand::Show {
            user_id: "u1".to_string(),
        },
        Some(config_path),
    )
    .await
    .expect("Second show should succeed");

    // MockServer verifies expect(1) on drop.
}

#[test_log::test(tokio::test)]
async fn test_refresh_bypasses_freshness_gate() {
    let backend = test_utils::backend_with_expected_calls("u1", 2).await;
    let data_dir = tempfile::tempdir().unwrap();
    let config =
        test_utils::write_config(Some(&backend.uri()), None, 300_000, data_dir.path());
    let config_path = config.path().to_str().unwrap();

    finsync::run_command(
        finsync::AppCommand::Show {
            user_id: "u1".to_string(),
        },
        Some(config_path),
    )
    .await
    .expect("Show should succeed");

    finsync::run_command(
        finsync::AppCommand::Refresh {
            user_ids: vec!["u1".to_string()],
        },
        Some(config_path),
    )
    .await
    .expect("Refresh should succeed despite a fresh cache");
}

#[test_log::test(tokio::test)]
async fn test_backend_failure_keeps_serving_cached_data() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let backend = MockServer::start().await;
    // One good response, everything after that fails.
    Mock::given(method("GET"))
        .and(path("/users/u1/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(test_utils::TRANSACTIONS_BODY))
        .up_to_n_times(1)
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1/transactions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    // Zero TTL: every read considers the cache stale and attempts a refresh.
    let config = test_utils::write_config(Some(&backend.uri()), None, 0, data_dir.path());
    let config_path = config.path().to_str().unwrap();

    finsync::run_command(
        finsync::AppCommand::Show {
            user_id: "u1".to_string(),
        },
        Some(config_path),
    )
    .await
    .expect("Initial fetch should succeed");

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    // The refetch fails, the cached record is served, no error escapes.
    finsync::run_command(
        finsync::AppCommand::Show {
            user_id: "u1".to_string(),
        },
        Some(config_path),
    )
    .await
    .expect("Show should serve stale data when the backend is down");
}

#[test_log::test(tokio::test)]
async fn test_convert_uses_builtin_rates_without_endpoint() {
    let data_dir = tempfile::tempdir().unwrap();
    let config = test_utils::write_config(None, None, 300_000, data_dir.path());

    finsync::run_command(
        finsync::AppCommand::Convert {
            amount: 100.0,
            from: "USD".to_string(),
            to: "VND".to_string(),
        },
        Some(config.path().to_str().unwrap()),
    )
    .await
    .expect("Convert should work with the built-in rate table");
}

#[test_log::test(tokio::test)]
async fn test_rates_from_mock_endpoint() {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let rates_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .and(query_param("base", "USD"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"base": "USD", "rates": {"VND": 24850.0, "EUR": 0.92}}"#),
        )
        .mount(&rates_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config =
        test_utils::write_config(None, Some(&rates_server.uri()), 300_000, data_dir.path());

    finsync::run_command(
        finsync::AppCommand::Rates,
        Some(config.path().to_str().unwrap()),
    )
    .await
    .expect("Rates should render the fetched table");
}

#[test_log::test(tokio::test)]
async fn test_convert_fails_when_rate_endpoint_down_and_no_last_good() {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let rates_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&rates_server)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config =
        test_utils::write_config(None, Some(&rates_server.uri()), 300_000, data_dir.path());

    let result = finsync::run_command(
        finsync::AppCommand::Convert {
            amount: 100.0,
            from: "USD".to_string(),
            to: "VND".to_string(),
        },
        Some(config.path().to_str().unwrap()),
    )
    .await;

    assert!(result.is_err(), "No table was ever fetched, convert must fail");
}

#[test_log::test(tokio::test)]
async fn test_show_without_backend_configured_fails() {
    let data_dir = tempfile::tempdir().unwrap();
    let config = test_utils::write_config(None, None, 300_000, data_dir.path());

    let result = finsync::run_command(
        finsync::AppCommand::Show {
            user_id: "u1".to_string(),
        },
        Some(config.path().to_str().unwrap()),
    )
    .await;

    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("No transactions provider configured")
    );
}
