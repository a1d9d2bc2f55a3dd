//! Call-site annotation
//!
//! Log calls are tagged with `[<file base name> <function>()]`. Both parts are
//! captured at compile time by `call_site!`, so callers never pass them by hand.

use std::borrow::Cow;

/// Source location of a log call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    function: Cow<'static, str>,
}

impl CallSite {
    /// Build a call site from a raw file path and a function signature
    pub fn new(file: &'static str, function: impl Into<Cow<'static, str>>) -> Self {
        Self {
            file,
            function: function.into(),
        }
    }

    /// Final path component of the file identifier (may be empty)
    pub fn file_name(&self) -> &'static str {
        base_name(self.file)
    }

    /// Function signature as captured
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Tag appended to formatted messages: `[<file> <function>]`
    ///
    /// An empty file identifier yields `[ <function>]`.
    pub fn tag(&self) -> String {
        format!("[{} {}]", self.file_name(), self.function)
    }
}

/// Strip any directory from a file identifier, on either separator
fn base_name(file: &str) -> &str {
    file.rsplit(['/', '\\']).next().unwrap_or_default()
}

/// Turn the type name of a nested item into a `name()` signature
///
/// `function_name!` declares a local `fn f` and inspects its type name, which
/// looks like `krate::module::func::f` or, inside closures and async blocks,
/// `krate::module::func::{{closure}}::f`.
#[doc(hidden)]
pub fn signature_from_type_name(type_name: &str) -> String {
    let mut path = type_name.strip_suffix("::f").unwrap_or(type_name);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    let name = path.rsplit("::").next().unwrap_or(path);
    format!("{}()", name)
}

/// Signature (`name()`) of the enclosing function
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::logging::call_site::signature_from_type_name(type_name_of(f))
    }};
}

/// `CallSite` of the current source location
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::logging::CallSite::new(file!(), $crate::function_name!())
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tag_strips_directories() {
        let site = CallSite::new("src/player/Observer.rs", "configure()");
        assert_eq!(site.tag(), "[Observer.rs configure()]");
    }

    #[test]
    fn test_tag_strips_windows_directories() {
        let site = CallSite::new("src\\net\\session.rs", "connect()");
        assert_eq!(site.file_name(), "session.rs");
    }

    #[test]
    fn test_empty_file_keeps_leading_space() {
        let site = CallSite::new("", "run()");
        assert_eq!(site.tag(), "[ run()]");
    }

    #[test]
    fn test_signature_from_plain_function() {
        assert_eq!(
            signature_from_type_name("oslogs::player::configure::f"),
            "configure()"
        );
    }

    #[test]
    fn test_signature_from_closure() {
        assert_eq!(
            signature_from_type_name("app::worker::spawn_jobs::{{closure}}::{{closure}}::f"),
            "spawn_jobs()"
        );
    }

    #[test]
    fn test_call_site_macro_captures_location() {
        let site = crate::call_site!();
        assert_eq!(site.file_name(), "call_site.rs");
        assert_eq!(site.function(), "test_call_site_macro_captures_location()");
    }

    proptest! {
        #[test]
        fn prop_tag_uses_last_component(
            dirs in proptest::collection::vec("[a-z]{1,8}", 0..4),
            name in "[A-Za-z]{1,10}\\.rs",
        ) {
            let mut path = dirs.join("/");
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&name);
            let file: &'static str = Box::leak(path.into_boxed_str());

            let site = CallSite::new(file, "go()");
            prop_assert_eq!(site.tag(), format!("[{} go()]", name));
        }
    }
}
