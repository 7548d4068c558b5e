use crate::error::GblnError;
use std::cell::RefCell;

thread_local! {
    static LAST_ERROR: RefCell<Option<GblnError>> = RefCell::new(None);
}

/// Record `err` as the most recent diagnostic for this thread, then return it unchanged.
///
/// Called at the point a `parse`/coercion/serialization failure is about to propagate,
/// so callers that only look at a numeric code can still retrieve the full diagnostic.
pub(crate) fn record(err: GblnError) -> GblnError {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(err.clone()));
    err
}

/// The most recent diagnostic recorded on this thread, if any.
pub fn last_error() -> Option<GblnError> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Clear the last-error slot for this thread.
pub fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

#[cfg(test)]
mod last_error_test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn records_and_clears() {
        clear_last_error();
        assert!(last_error().is_none());
        record(GblnError::new(ErrorKind::UnexpectedEof, "eof"));
        assert_eq!(last_error().unwrap().kind(), ErrorKind::UnexpectedEof);
        clear_last_error();
        assert!(last_error().is_none());
    }
}
