//! # Override Flows
//!
//! Application components registered next to the framework's: new
//! libraries, replaced components and `MY_`-prefixed extensions, resolved
//! through a booted kernel.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{boot, response, App, STATUS_TEXTS};
    use bootstrap_runtime::{exit_code, Benchmark};
    use bootstrap_types::{
        Component, ConstructionError, ErrorPage, ErrorPresenter, FailureRecord, Fault, Interface,
        LogLevel, Logger, Severity, CORE, LIBRARIES,
    };
    use class_registry::{SearchRoot, EXCEPTIONS, LOG};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts messages, then hands them to the framework logger.
    struct CountingLogger {
        inner: Arc<dyn Logger>,
        count: Arc<AtomicUsize>,
    }

    impl Logger for CountingLogger {
        fn write_log(&self, level: LogLevel, message: &str) -> bool {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.inner.write_log(level, message)
        }
    }

    /// Application replacement for the error pages.
    struct PlainPresenter;

    impl ErrorPresenter for PlainPresenter {
        fn render_php_error(&self, record: &FailureRecord) -> String {
            format!("[php] {}\n", record.message)
        }

        fn render_exception(&self, fault: &Fault) -> String {
            format!("[exception] {}\n", fault.message)
        }

        fn render_error(&self, page: &ErrorPage) -> String {
            format!("[{}] {}\n", page.status, page.messages.join(" "))
        }
    }

    struct Timer {
        base: Arc<Benchmark>,
        label: String,
    }

    // =========================================================================
    // EXTENSIONS
    // =========================================================================

    #[test]
    fn test_logger_extension_sees_pipeline_messages() {
        let app = App::new(&format!("log_threshold = 1\nlog_path = \"logs\"\n{STATUS_TEXTS}"));
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let (_host, kernel) = boot(&app.settings(Interface::Server, "development"), |catalog| {
            catalog.provide(SearchRoot::Application, CORE, "MY_Log", move |c| {
                let inner = c
                    .construct_base()?
                    .as_logger()
                    .ok_or_else(|| ConstructionError::Failed("Log is not a logger".into()))?;
                Ok(Component::Logger(Arc::new(CountingLogger {
                    inner,
                    count: Arc::clone(&counter),
                })))
            });
        });
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            ctx.trigger_error(Severity::WARNING, "Slow query")?;
            Ok(())
        });

        assert!(outcome.is_ok());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(app.log_contents("logs").contains("Severity: Warning --> Slow query"));
    }

    #[test]
    fn test_library_extension_wraps_base_with_first_argument() {
        let app = App::new("");
        let (_host, kernel) = boot(&app.settings(Interface::Cli, "development"), |catalog| {
            catalog.provide(SearchRoot::Application, LIBRARIES, "MY_Benchmark", |c| {
                let base = c
                    .construct_base()?
                    .downcast_library::<Benchmark>()
                    .ok_or_else(|| ConstructionError::Failed("not a benchmark".into()))?;
                Ok(Component::library(Timer {
                    base,
                    label: c.class_name().to_string(),
                }))
            });
        });
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            let first = ctx.library::<Timer>("Benchmark", Some(json!({ "decimals": 1 })))?;
            let second = ctx.library::<Timer>("Benchmark", Some(json!({ "decimals": 6 })))?;
            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(first.label, "MY_Benchmark");

            first.base.mark("a");
            let shown = first.base.elapsed_display("a", "b").unwrap();
            assert_eq!(shown.split('.').nth(1).map(str::len), Some(1));
            Ok(())
        });

        assert!(outcome.is_ok());
        assert!(kernel.registry().tracker().is_loaded("BENCHMARK"));
    }

    #[test]
    fn test_malformed_extension_is_bootstrap_fatal() {
        let app = App::new(STATUS_TEXTS);
        let (host, kernel) = boot(&app.settings(Interface::Server, "development"), |catalog| {
            catalog.provide(SearchRoot::Application, LIBRARIES, "MY_Benchmark", |_| {
                Err(ConstructionError::Failed("parse error in MY_Benchmark".into()))
            });
        });
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            ctx.resolve("Benchmark")?;
            Ok(())
        });

        assert_eq!(exit_code(&outcome).code(), 5);
        let response = response(&host);
        assert!(response.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
        assert!(response.ends_with("Unable to load the specified class: MY_Benchmark.php"));
    }

    #[test]
    fn test_prefix_comes_from_configuration() {
        let app = App::new("subclass_prefix = \"APP_\"");
        let (_host, kernel) = boot(&app.settings(Interface::Cli, "development"), |catalog| {
            catalog
                .provide(SearchRoot::Application, LIBRARIES, "MY_Benchmark", |_| {
                    Ok(Component::library(String::from("ignored")))
                })
                .provide(SearchRoot::Application, LIBRARIES, "APP_Benchmark", |_| {
                    Ok(Component::library(String::from("bound")))
                });
        });
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            let bound = ctx.library::<String>("Benchmark", None)?;
            assert_eq!(bound.as_str(), "bound");
            Ok(())
        });
        assert!(outcome.is_ok());
    }

    // =========================================================================
    // REPLACEMENTS
    // =========================================================================

    #[test]
    fn test_application_presenter_replaces_framework_pages() {
        let app = App::new(STATUS_TEXTS);
        let (host, kernel) = boot(&app.settings(Interface::Server, "development"), |catalog| {
            catalog.provide(SearchRoot::Application, CORE, EXCEPTIONS, |_| {
                Ok(Component::Presenter(Arc::new(PlainPresenter)))
            });
        });
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| Err(ctx.show_error("Closed for maintenance", 503, None).into()));

        assert_eq!(exit_code(&outcome).code(), 1);
        assert_eq!(host.body(), "[503] Closed for maintenance\n");
        assert_eq!(
            host.status_line().as_deref(),
            Some("HTTP/1.1 503 Service Unavailable")
        );
    }

    #[test]
    fn test_application_library_resolves_once() {
        let app = App::new("");
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);

        let (_host, kernel) = boot(&app.settings(Interface::Cli, "testing"), |catalog| {
            catalog.provide(SearchRoot::Application, LIBRARIES, "Cart", move |c| {
                counter.fetch_add(1, Ordering::SeqCst);
                let items: Vec<String> = c.options()?;
                Ok(Component::library(items))
            });
        });
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            let first = ctx.library::<Vec<String>>("Cart", Some(json!(["apple"])))?;
            let second = ctx.library::<Vec<String>>("Cart", Some(json!(["pear", "plum"])))?;
            assert_eq!(first.as_slice(), ["apple".to_string()]);
            assert!(Arc::ptr_eq(&first, &second));
            Ok(())
        });

        assert!(outcome.is_ok());
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_logger_replaced_with_wrong_capability() {
        let app = App::new(STATUS_TEXTS);
        let (host, kernel) = boot(&app.settings(Interface::Server, "development"), |catalog| {
            catalog.provide(SearchRoot::Application, CORE, LOG, |_| {
                Ok(Component::library(()))
            });
        });
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            ctx.trigger_error(Severity::NOTICE, "anything")?;
            Ok(())
        });

        assert_eq!(exit_code(&outcome).code(), 5);
        assert!(host.body().contains("Log.php"));
    }
}
