use std::collections::HashSet;

use crate::error::StructureError;

/// Checks whether a given boolean expression is true or false, logs a warning if it is false, and returns the result of the boolean expression.
#[cfg(feature = "log")]
macro_rules! warn_unless {
    ( $condition:expr, $message:expr $(, $format_arg:expr)* $(,)? ) => {
        if $condition {
            true
        } else {
            log::warn!($message $(,$format_arg)*);
            false
        }
    }
}

#[cfg(not(feature = "log"))]
macro_rules! warn_unless {
    ( $condition:expr $(, $_message_part:expr)* $(,)? ) => {
        $condition
    }
}

pub(crate) use warn_unless;

pub(crate) fn ensure_non_empty<T>(list: &str, values: &[T]) -> Result<(), StructureError> {
    if values.is_empty() {
        Err(StructureError::EmptyRequiredList(list.to_string()))
    } else {
        Ok(())
    }
}

/// Returns the first key that was already seen, in iteration order.
pub(crate) fn first_duplicate<'a, I>(keys: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    keys.into_iter().find(|&key| !seen.insert(key))
}

pub(crate) fn ensure_unique<'a, I>(list: &str, keys: I) -> Result<(), StructureError>
where
    I: IntoIterator<Item = &'a str>,
{
    match first_duplicate(keys) {
        Some(key) => Err(StructureError::DuplicateEntry {
            list: list.to_string(),
            key: key.to_string(),
        }),
        None => Ok(()),
    }
}
