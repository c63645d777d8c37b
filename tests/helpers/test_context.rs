//! Test context wiring services against the mock servers

use gate_console::config::{DataSource, Settings};
use gate_console::services::ServiceFactory;
use tempfile::TempDir;

use super::device_mock::DeviceMockServer;
use super::store_mock::{StoreMockServer, TEST_API_KEY};

/// Test configuration options
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub with_store: bool,
    pub students: DataSource,
    pub attendance: DataSource,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            with_store: true,
            students: DataSource::Local,
            attendance: DataSource::Local,
        }
    }
}

/// Mock servers plus the services configured against them
pub struct TestContext {
    pub device: DeviceMockServer,
    pub store: Option<StoreMockServer>,
    pub services: ServiceFactory,
    pub settings: Settings,
    _session_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    pub async fn with_config(config: TestConfig) -> Self {
        let device = DeviceMockServer::new().await;
        let store = if config.with_store {
            Some(StoreMockServer::new().await)
        } else {
            None
        };
        let session_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let settings = test_settings(&device, store.as_ref(), &session_dir, &config);
        let services = ServiceFactory::new(&settings).expect("Failed to create services");

        Self {
            device,
            store,
            services,
            settings,
            _session_dir: session_dir,
        }
    }

    pub fn store(&self) -> &StoreMockServer {
        self.store.as_ref().expect("Context has no store")
    }
}

pub fn test_settings(
    device: &DeviceMockServer,
    store: Option<&StoreMockServer>,
    session_dir: &TempDir,
    config: &TestConfig,
) -> Settings {
    let mut settings = Settings::default();
    settings.device.base_url = Some(device.base_url());
    settings.device.timeout_seconds = 2;
    settings.device.connection_check_timeout_seconds = 1;

    match store {
        Some(store) => {
            settings.store.url = store.url();
            settings.store.api_key = TEST_API_KEY.to_string();
            settings.sync.enabled = true;
        }
        None => settings.sync.enabled = false,
    }
    settings.sync.request_timeout_seconds = 2;

    settings.data_source.students = config.students;
    settings.data_source.attendance = config.attendance;
    settings.auth.session_path = session_dir
        .path()
        .join("session.json")
        .to_string_lossy()
        .into_owned();
    settings.logging.file_path = String::new();
    settings
}
