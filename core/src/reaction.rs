//! Reaction callbacks invoked for each notification

use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::LiveReloadError;
use crate::notification::Notification;

/// Callback type for reacting to notifications
pub type ReactionCallback = Arc<
    dyn Fn(Notification) -> Pin<Box<dyn Future<Output = Result<(), LiveReloadError>> + Send>>
        + Send
        + Sync,
>;

/// Wrap an async closure as a [`ReactionCallback`].
///
/// ```
/// use livereload_core::reaction_fn;
///
/// let reaction = reaction_fn(|notification| async move {
///     println!("reload requested ({} bytes)", notification.payload().len());
///     Ok(())
/// });
/// ```
pub fn reaction_fn<F, Fut>(f: F) -> ReactionCallback
where
    F: Fn(Notification) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), LiveReloadError>> + Send + 'static,
{
    Arc::new(move |notification| Box::pin(f(notification)))
}

/// A reaction that does nothing. Useful when only lifecycle events matter.
pub fn noop_reaction() -> ReactionCallback {
    reaction_fn(|_| async { Ok(()) })
}

/// Run the reaction, turning both errors and panics into `ReactionError`.
pub(crate) async fn invoke(
    reaction: &ReactionCallback,
    notification: Notification,
) -> Result<(), LiveReloadError> {
    let call = AssertUnwindSafe(async { reaction(notification).await }).catch_unwind();

    match call.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(LiveReloadError::ReactionError(message))) => {
            Err(LiveReloadError::ReactionError(message))
        }
        Ok(Err(other)) => Err(LiveReloadError::ReactionError(other.to_string())),
        Err(panic) => Err(LiveReloadError::ReactionError(format!(
            "reaction panicked: {}",
            panic_message(panic.as_ref())
        ))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invoke_passes_through_success() {
        let reaction = reaction_fn(|n| async move {
            assert_eq!(n.sequence(), 3);
            Ok(())
        });

        assert!(invoke(&reaction, Notification::new(3, "reload")).await.is_ok());
    }

    #[tokio::test]
    async fn test_invoke_wraps_errors() {
        let reaction = reaction_fn(|_| async {
            Err(LiveReloadError::InternalError("boom".to_string()))
        });

        let err = invoke(&reaction, Notification::new(1, "reload"))
            .await
            .unwrap_err();
        assert!(matches!(err, LiveReloadError::ReactionError(ref m) if m.contains("boom")));
    }

    #[tokio::test]
    async fn test_invoke_catches_panics() {
        let reaction = reaction_fn(|_| async {
            if true {
                panic!("reaction exploded");
            }
            Ok(())
        });

        let err = invoke(&reaction, Notification::new(1, "reload"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, LiveReloadError::ReactionError(ref m) if m.contains("reaction exploded"))
        );
    }
}
