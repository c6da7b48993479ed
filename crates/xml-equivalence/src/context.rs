//! Exclusive ownership of the engine's global comparison flags
//!
//! The diff engine reads its flags from process-wide state while it walks
//! the documents, so a comparison has to hold those flags fixed from
//! before the diff is built until its result has been evaluated. An
//! [`EngineContext`] does that: it takes a single process-wide token,
//! applies the flags for a [`Settings`] set, and puts the previous values
//! back when closed.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use xml_diff_engine::{ConfigStore, EngineConfig, EngineFlag, GlobalConfig, Result};

use crate::setting::{Setting, Settings};

static ENGINE_TOKEN: Mutex<()> = Mutex::new(());
static GLOBAL_STORE: GlobalConfig = GlobalConfig;

/// The engine flags a set of settings asks for; absent settings turn
/// their flag off.
pub fn engine_config_for(settings: &Settings) -> EngineConfig {
    EngineConfig {
        ignore_attribute_order: settings.contains(Setting::IgnoreAttributeOrder),
        ignore_comments: settings.contains(Setting::IgnoreComments),
        ignore_diff_between_text_and_cdata: settings.contains(Setting::IgnoreCdataTextDistinction),
        ignore_whitespace: settings.contains(Setting::IgnoreLeadingTrailingWhitespace),
        normalize: settings.contains(Setting::NormalizeDocument),
        normalize_whitespace: settings.contains(Setting::NormalizeWhitespace),
    }
}

/// Whether some context currently holds the token.
///
/// Diagnostic only: the answer may be stale by the time it is returned.
pub fn token_is_held() -> bool {
    matches!(ENGINE_TOKEN.try_lock(), Err(TryLockError::WouldBlock))
}

fn acquire_token() -> MutexGuard<'static, ()> {
    match ENGINE_TOKEN.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::Poisoned(poisoned)) => recover(poisoned),
        Err(TryLockError::WouldBlock) => {
            tracing::warn!(
                "Unable to immediately obtain the engine configuration token, beware of \
                 contention between concurrent comparisons. Waiting..."
            );
            ENGINE_TOKEN.lock().unwrap_or_else(recover)
        }
    }
}

/// Take over a poisoned token and clear the poison, so only the first open
/// after a panic warns.
fn recover(poisoned: PoisonError<MutexGuard<'static, ()>>) -> MutexGuard<'static, ()> {
    tracing::warn!("engine configuration token was poisoned by a panicking comparison, recovering");
    let guard = poisoned.into_inner();
    ENGINE_TOKEN.clear_poison();
    guard
}

/// Scoped, exclusive application of [`Settings`] to the engine's flags.
///
/// At most one context is open per process. Contexts hold a lock guard, so
/// they stay on the thread that opened them, and opening a second one on
/// that thread blocks forever.
pub struct EngineContext<'a> {
    guard: Option<MutexGuard<'static, ()>>,
    saved: EngineConfig,
    store: &'a dyn ConfigStore,
}

impl EngineContext<'static> {
    /// Open a context over the engine's global flags
    pub fn open(settings: &Settings) -> Result<Self> {
        Self::open_with(settings, &GLOBAL_STORE)
    }

    /// Run `body` with the global flags set for `settings`, closing the
    /// context on every exit path.
    pub fn scoped<R>(settings: &Settings, body: impl FnOnce() -> Result<R>) -> Result<R> {
        EngineContext::scoped_with(settings, &GLOBAL_STORE, body)
    }
}

impl<'a> EngineContext<'a> {
    /// Open a context over any flag store.
    ///
    /// Blocks until the process-wide token is free. The current flags are
    /// only read once the token is held.
    pub fn open_with(settings: &Settings, store: &'a dyn ConfigStore) -> Result<Self> {
        let guard = acquire_token();

        let mut saved = EngineConfig::STRICT;
        for flag in EngineFlag::ALL {
            saved.set(flag, store.get(flag)?);
        }

        let mut context = EngineContext {
            guard: Some(guard),
            saved,
            store,
        };
        let wanted = engine_config_for(settings);
        for flag in EngineFlag::ALL {
            if let Err(e) = store.set(flag, wanted.get(flag)) {
                if let Err(restore) = context.close() {
                    tracing::error!(error = %restore, "failed to undo partially applied settings");
                }
                return Err(e);
            }
        }
        tracing::debug!(%settings, "opened engine context");
        Ok(context)
    }

    pub fn scoped_with<R>(
        settings: &Settings,
        store: &'a dyn ConfigStore,
        body: impl FnOnce() -> Result<R>,
    ) -> Result<R> {
        let mut context = EngineContext::open_with(settings, store)?;
        let result = body();
        let closed = context.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    pub fn is_open(&self) -> bool {
        self.guard.is_some()
    }

    /// The flag values that will be restored on close
    pub fn saved(&self) -> &EngineConfig {
        &self.saved
    }

    /// Restore the saved flags and release the token.
    ///
    /// Every flag is attempted and the token is released even when a
    /// restore fails; the first failure is returned afterwards and the
    /// engine's flags are then in an unknown state. Closing twice is
    /// logged and otherwise ignored.
    pub fn close(&mut self) -> Result<()> {
        let Some(guard) = self.guard.take() else {
            tracing::error!("Detected repeated attempt to close a single engine context");
            return Ok(());
        };

        let mut first_error = None;
        for flag in EngineFlag::ALL {
            if let Err(e) = self.store.set(flag, self.saved.get(flag)) {
                first_error.get_or_insert(e);
            }
        }
        drop(guard);

        match first_error {
            Some(e) => {
                tracing::error!(
                    error = %e,
                    "failed to restore engine flags while closing context; token released, \
                     further engine behavior is undefined"
                );
                Err(e)
            }
            None => {
                tracing::debug!("closed engine context");
                Ok(())
            }
        }
    }
}

impl Drop for EngineContext<'_> {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::error!("engine context was dropped without being closed");
            // close() reports its own failure
            let _ = self.close();
        }
    }
}

impl std::fmt::Debug for EngineContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("open", &self.is_open())
            .field("saved", &self.saved)
            .finish_non_exhaustive()
    }
}
