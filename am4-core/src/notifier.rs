use std::sync::Arc;

use am4_database::store::{ObservedUserStore, UpdateObserver, UserHooks};
use am4_database::{UserRecord, UserStore};
use tracing::info;

/// Logs every user update together with the record's email.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateNotifier;

impl UpdateObserver for UpdateNotifier {
    fn after_update(&self, user: &UserRecord) {
        info!(
            user_id = user.id,
            email = user.email.as_deref().unwrap_or_default(),
            "user updated..."
        );
    }
}

/// Wrap `inner` so that every successful update reaches [`UpdateNotifier`].
pub fn with_update_notifier(inner: Arc<dyn UserStore>) -> Arc<dyn UserStore> {
    let mut hooks = UserHooks::new();
    hooks.on_after_update(UpdateNotifier);
    Arc::new(ObservedUserStore::new(inner, hooks))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use am4_database::store::{MemoryUserStore, UpdateObserver};
    use am4_database::{NewUser, UserChanges, UserStore};
    use tracing_subscriber::fmt::MakeWriter;

    use super::{UpdateNotifier, with_update_notifier};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capturing_subscriber(captured: &Captured) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish()
    }

    #[test]
    fn logs_the_email_once() {
        let captured = Captured::default();
        let mut user = NewUser::from_discord("pilot", "Air", "EASY", 1, "hash").into_record(3, 0);
        user.email = Some("pilot@example.com".to_owned());

        tracing::subscriber::with_default(capturing_subscriber(&captured), || {
            UpdateNotifier.after_update(&user);
        });

        let output = captured.contents();
        assert_eq!(output.matches("user updated...").count(), 1);
        assert!(output.contains("pilot@example.com"));
        assert!(output.contains("INFO"));
    }

    #[tokio::test]
    async fn store_updates_emit_the_post_update_email() {
        let captured = Captured::default();
        let _guard = tracing::subscriber::set_default(capturing_subscriber(&captured));

        let store = with_update_notifier(Arc::new(MemoryUserStore::new()));
        let user = store
            .create(&NewUser::from_discord("pilot", "Air", "EASY", 1, "hash"))
            .await
            .unwrap();
        assert_eq!(captured.contents().matches("user updated...").count(), 0);

        let changes = UserChanges {
            email: Some("after@example.com".to_owned()),
            ..UserChanges::default()
        };
        store.update(user.id, &changes).await.unwrap();

        let output = captured.contents();
        assert_eq!(output.matches("user updated...").count(), 1);
        assert!(output.contains("after@example.com"));
    }
}
