//! Assembly helpers shared by unit and integration tests: a JSON-file
//! store in a caller-provided scratch directory and a recording mail
//! transport.

use std::num::NonZeroU64;
use std::path::Path;
use std::sync::Arc;

use crate::config;
use crate::mailer::MemoryTransport;
use crate::store::JsonStore;
use crate::util::Sensitive;
use crate::App;

pub fn test_config(data_dir: &Path) -> config::Server {
    config::Server {
        http: config::Http::default(),
        db: None,
        data_dir: data_dir.to_path_buf(),
        auth: config::Auth {
            username: "admin".to_string(),
            password: Sensitive::from("letmein-123456"),
            session_secret: Sensitive::from("0123456789abcdef"),
            session_ttl_hours: NonZeroU64::new(24).expect("nonzero ttl"),
        },
        smtp: config::Smtp::default(),
        booking: config::Booking {
            admin_emails: "clinic@example.com,front-desk@example.com".to_string(),
            ..Default::default()
        },
        newsletter: config::Newsletter { send_delay_ms: 0 },
        uploads: config::Uploads::default(),
    }
}

/// The returned transport handle is the same one the app sends through,
/// so tests can inspect or fail deliveries.
pub fn build_test_app(data_dir: &Path) -> (App, Arc<MemoryTransport>) {
    let store = Arc::new(JsonStore::open(data_dir).expect("open scratch json store"));
    let mailer = Arc::new(MemoryTransport::new());
    let app = App::assemble(test_config(data_dir), store, mailer.clone())
        .expect("assemble test app");
    (app, mailer)
}
