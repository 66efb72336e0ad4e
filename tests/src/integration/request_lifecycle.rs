//! # Request Lifecycle Flows
//!
//! Boot, request, shutdown and exit code, observed from outside: the bytes
//! the client receives, the log file and the process exit status.
//!
//! ## Flows Tested:
//!
//! 1. **Boot failures**: bad environment and bad configuration end with 503
//! 2. **Runtime errors**: recoverable, fatal and suppressed severities
//! 3. **Aborts**: `show_error` and `show_404` exit codes and status lines
//! 4. **Shutdown**: panics recovered as late fatals; clean requests untouched
//! 5. **Bootstrap fatal**: unknown components never reach the log

#[cfg(test)]
mod tests {
    use super::super::fixtures::{boot, response, App, STATUS_TEXTS};
    use bootstrap_runtime::{exit_code, Benchmark};
    use bootstrap_types::{ExitCode, Fault, Interface, LogLevel, Severity};

    fn logging_config() -> String {
        format!("log_threshold = 4\nlog_path = \"logs\"\n{STATUS_TEXTS}")
    }

    // =========================================================================
    // BOOT
    // =========================================================================

    #[test]
    fn test_unknown_environment_exits_1_with_503() {
        let app = App::new(STATUS_TEXTS);
        let (host, kernel) = boot(&app.settings(Interface::Server, "staging"), |_| {});

        assert_eq!(exit_code(&kernel.map(|_| ())).code(), 1);
        let response = response(&host);
        assert!(response.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
        assert!(response.ends_with("The application environment is not set correctly."));
    }

    #[test]
    fn test_malformed_configuration_exits_3() {
        let app = App::new("subclass_prefix = \"MY_");
        let (host, kernel) = boot(&app.settings(Interface::Cgi, "development"), |_| {});

        assert_eq!(exit_code(&kernel.map(|_| ())).code(), 3);
        let response = response(&host);
        assert!(response.starts_with("Status: 503 Service Unavailable\r\n"));
        assert!(response.ends_with("Your config file does not appear to be formatted correctly."));
    }

    #[test]
    fn test_missing_configuration_exits_3_under_cli() {
        let app = App::empty();
        let (host, kernel) = boot(&app.settings(Interface::Cli, "production"), |_| {});

        assert_eq!(exit_code(&kernel.map(|_| ())).code(), 3);
        assert_eq!(response(&host), "The configuration file does not exist.");
    }

    // =========================================================================
    // RUNTIME ERRORS
    // =========================================================================

    #[test]
    fn test_warning_is_logged_and_request_completes() {
        let app = App::new(&logging_config());
        let (host, kernel) = boot(&app.settings(Interface::Server, "development"), |_| {});
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            ctx.trigger_error(Severity::USER_WARNING, "Deprecated helper")?;
            ctx.output("<p>done</p>");
            Ok(())
        });

        assert_eq!(exit_code(&outcome), ExitCode::SUCCESS);
        let response = response(&host);
        assert!(response.contains("A PHP Error was encountered"));
        assert!(response.ends_with("<p>done</p>"));
        assert!(host.status_line().is_none());

        let log = app.log_contents("logs");
        assert!(log.contains("ERROR - "));
        assert!(log.contains("--> Severity: User Warning --> Deprecated helper "));
    }

    #[test]
    fn test_production_fatal_is_hidden_but_logged() {
        let app = App::new(&logging_config());
        let (host, kernel) = boot(&app.settings(Interface::Server, "production"), |_| {});
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            ctx.trigger_error(Severity::USER_ERROR, "Ledger mismatch")?;
            ctx.output("unreachable");
            Ok(())
        });

        assert_eq!(exit_code(&outcome).code(), 1);
        assert_eq!(
            host.status_line().as_deref(),
            Some("HTTP/1.1 500 Internal Server Error")
        );
        assert!(host.body().is_empty());
        assert!(app
            .log_contents("logs")
            .contains("Severity: User Error --> Ledger mismatch"));
    }

    #[test]
    fn test_production_notice_is_suppressed() {
        let app = App::new(&logging_config());
        let (host, kernel) = boot(&app.settings(Interface::Server, "production"), |_| {});
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            ctx.trigger_error(Severity::USER_NOTICE, "Just so you know")?;
            Ok(())
        });

        assert!(outcome.is_ok());
        assert!(host.body().is_empty());
        assert!(host.status_line().is_none());
        assert!(!app.log_contents("logs").contains("Just so you know"));
    }

    #[test]
    fn test_uncaught_fault_is_logged_with_prefix() {
        let app = App::new(&logging_config());
        let (host, kernel) = boot(&app.settings(Interface::Cli, "development"), |_| {});
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|_| Err(Fault::raise("RuntimeException", "Queue offline").into()));

        assert_eq!(exit_code(&outcome).code(), 1);
        assert!(host.body().contains("Type:        RuntimeException"));
        assert!(app
            .log_contents("logs")
            .contains("Severity: error --> Exception: Queue offline"));
    }

    // =========================================================================
    // ABORTS
    // =========================================================================

    #[test]
    fn test_show_error_exit_code_shorthand() {
        let app = App::new(STATUS_TEXTS);
        let (host, kernel) = boot(&app.settings(Interface::Server, "production"), |_| {});
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| Err(ctx.show_error("Try later", 50, None).into()));

        assert_eq!(exit_code(&outcome).code(), 59);
        let response = response(&host);
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.contains("Try later"));
    }

    #[test]
    fn test_show_error_passes_status_through() {
        let app = App::new(STATUS_TEXTS);
        let (host, kernel) = boot(&app.settings(Interface::Server, "production"), |_| {});
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| Err(ctx.show_error("Odd", 150, Some("Odd")).into()));

        assert_eq!(exit_code(&outcome).code(), 1);
        assert_eq!(host.status_line().as_deref(), Some("HTTP/1.1 150"));
    }

    #[test]
    fn test_show_404_under_cgi() {
        let app = App::new(&logging_config());
        let (host, kernel) = boot(&app.settings(Interface::Cgi, "production"), |_| {});
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| Err(ctx.show_404("blog/missing-post", true).into()));

        assert_eq!(exit_code(&outcome).code(), 4);
        let response = response(&host);
        assert!(response.starts_with("Status: 404 Not Found\r\n"));
        assert!(response.contains("<h1>404 Page Not Found</h1>"));
        assert!(app
            .log_contents("logs")
            .contains("404 Page Not Found: blog/missing-post"));
    }

    // =========================================================================
    // SHUTDOWN
    // =========================================================================

    #[test]
    fn test_clean_request_leaves_no_trace() {
        let app = App::new(&logging_config());
        let (host, kernel) = boot(&app.settings(Interface::Server, "development"), |_| {});
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            let benchmark = ctx.library::<Benchmark>("Benchmark", None)?;
            benchmark.mark("start");
            ctx.output("hello");
            Ok(())
        });

        assert_eq!(exit_code(&outcome), ExitCode::SUCCESS);
        assert!(host.status_line().is_none());
        assert_eq!(host.body(), "hello");
        assert!(!app.log_contents("logs").contains("Severity:"));
    }

    #[test]
    fn test_panic_is_recovered_as_late_fatal() {
        let app = App::new(&logging_config());
        let (host, kernel) = boot(&app.settings(Interface::Server, "production"), |_| {});
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|_| panic!("stack exhausted"));

        assert_eq!(exit_code(&outcome).code(), 1);
        assert_eq!(
            host.status_line().as_deref(),
            Some("HTTP/1.1 500 Internal Server Error")
        );
        assert!(app
            .log_contents("logs")
            .contains("Severity: Error --> stack exhausted"));
    }

    // =========================================================================
    // BOOTSTRAP FATAL
    // =========================================================================

    #[test]
    fn test_unknown_component_bypasses_the_log() {
        let app = App::new(&logging_config());
        let (host, kernel) = boot(&app.settings(Interface::Server, "development"), |_| {});
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            ctx.log_message(LogLevel::Info, "before")?;
            ctx.resolve("DoesNotExist")?;
            Ok(())
        });

        assert_eq!(exit_code(&outcome).code(), 5);
        let response = response(&host);
        assert!(response.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
        assert!(response.ends_with("Unable to locate the specified class: DoesNotExist.php"));

        let log = app.log_contents("logs");
        assert!(log.contains("INFO - "));
        assert!(!log.contains("DoesNotExist"));
    }
}
