/// Thread-local "current" context
///
/// Convenience for applications with a single context: park it here once and
/// reach it from anywhere on the same thread. Each thread has its own slot,
/// so a context is only ever current on the thread that owns it.
///
/// # Example
///
/// ```no_run
/// use prism_gpu::prism::settings::{ApiType, Settings};
/// use prism_gpu::prism::window::HeadlessWindow;
/// use prism_gpu_context::prism::context::{current, RenderContext};
///
/// let settings = Settings { preferred_api: ApiType::Headless, ..Settings::default() };
/// let mut context = RenderContext::create(settings, HeadlessWindow::default())?;
/// context.init()?;
/// current::make_current(context);
///
/// current::with_current(|context: &mut RenderContext<HeadlessWindow>| context.begin_frame())??;
/// # Ok::<(), prism_gpu::prism::Error>(())
/// ```

use std::any::Any;
use std::cell::RefCell;

use prism_gpu::prism::settings::ApiType;
use prism_gpu::prism::window::Window;
use prism_gpu::prism::{Error, Result};
use prism_gpu::{gpu_raise, gpu_warn};

use crate::render_context::RenderContext;

const SOURCE: &str = "prism::context::current";

struct Current {
    api: ApiType,
    context: Box<dyn Any>,
}

thread_local! {
    static CURRENT: RefCell<Option<Current>> = const { RefCell::new(None) };
}

/// Make `context` current on this thread
///
/// Returns the previously current context when it had the same window type.
/// One of another window type is dropped, which shuts it down.
pub fn make_current<W: Window + 'static>(context: RenderContext<W>) -> Option<RenderContext<W>> {
    let api = context.api();
    let previous = CURRENT.with(|slot| {
        slot.borrow_mut().replace(Current { api, context: Box::new(context) })
    })?;

    match previous.context.downcast::<RenderContext<W>>() {
        Ok(previous) => Some(*previous),
        Err(_) => {
            gpu_warn!(
                SOURCE,
                "Replaced {} context of another window type, shutting it down",
                previous.api
            );
            None
        }
    }
}

/// Take the current context off this thread
///
/// `None` when there is no current context or it has another window type,
/// in which case it stays current.
pub fn take_current<W: Window + 'static>() -> Option<RenderContext<W>> {
    CURRENT.with(|slot| {
        let mut slot = slot.borrow_mut();
        if !slot.as_ref().is_some_and(|current| current.context.is::<RenderContext<W>>()) {
            return None;
        }
        let current = slot.take()?;
        current.context.downcast::<RenderContext<W>>().ok().map(|context| *context)
    })
}

/// Run `f` on the current context
///
/// Fails when there is no current context, when it has another window type,
/// or when called from inside another `with_current`.
pub fn with_current<W, R>(f: impl FnOnce(&mut RenderContext<W>) -> R) -> Result<R>
where
    W: Window + 'static,
{
    CURRENT.with(|slot| {
        let mut slot = slot.try_borrow_mut().map_err(|_| {
            gpu_raise!(
                SOURCE,
                Error::InvalidResource("current context is already borrowed".to_string())
            )
        })?;
        let current = slot.as_mut().ok_or_else(|| {
            gpu_raise!(SOURCE, Error::InvalidResource("no current context".to_string()))
        })?;
        let context = current.context.downcast_mut::<RenderContext<W>>().ok_or_else(|| {
            gpu_raise!(
                SOURCE,
                Error::InvalidResource("current context has another window type".to_string())
            )
        })?;
        Ok(f(context))
    })
}

/// API of the current context, if any
pub fn current_api() -> Option<ApiType> {
    CURRENT.with(|slot| slot.try_borrow().ok().and_then(|slot| slot.as_ref().map(|current| current.api)))
}

pub fn has_current() -> bool {
    current_api().is_some()
}

#[cfg(test)]
#[path = "current_tests.rs"]
mod tests;
