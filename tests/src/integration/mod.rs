//! Integration flows across the registry, the pipeline and the runtime.

pub mod override_flows;
pub mod request_lifecycle;

#[cfg(test)]
pub(crate) mod fixtures {
    use bootstrap_runtime::{Kernel, ProcessHost, RuntimeSettings};
    use bootstrap_types::{Halt, Interface};
    use class_registry::Catalog;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    pub const STATUS_TEXTS: &str = r#"
[status_texts]
404 = "Not Found"
500 = "Internal Server Error"
503 = "Service Unavailable"
"#;

    /// Temporary application directory with a main configuration file.
    pub struct App {
        pub dir: TempDir,
    }

    impl App {
        pub fn new(config: &str) -> Self {
            let app = Self::empty();
            app.write("config/config.toml", config);
            app
        }

        pub fn empty() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        pub fn write(&self, relative: &str, content: &str) {
            let path = self.dir.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        pub fn path(&self) -> &Path {
            self.dir.path()
        }

        pub fn settings(&self, interface: Interface, environment: &str) -> RuntimeSettings {
            RuntimeSettings {
                app_path: self.path().to_path_buf(),
                environment: environment.to_string(),
                interface,
                ..RuntimeSettings::default()
            }
        }

        /// Every log file written so far, concatenated.
        pub fn log_contents(&self, log_dir: &str) -> String {
            let dir: PathBuf = self.path().join(log_dir);
            let Ok(entries) = fs::read_dir(dir) else {
                return String::new();
            };
            entries
                .filter_map(Result::ok)
                .map(|entry| fs::read_to_string(entry.path()).unwrap())
                .collect()
        }
    }

    pub fn boot<F>(settings: &RuntimeSettings, register_app: F) -> (Arc<ProcessHost>, Result<Kernel, Halt>)
    where
        F: FnOnce(&mut Catalog),
    {
        let host = Arc::new(ProcessHost::from_settings(settings));
        let kernel = Kernel::boot(settings, Arc::clone(&host), register_app);
        (host, kernel)
    }

    /// Full response as the client would receive it.
    pub fn response(host: &ProcessHost) -> String {
        let mut out = Vec::new();
        host.finish(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }
}
