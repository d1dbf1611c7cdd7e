//! Two-tier environment for spawned commands.
//!
//! Caller overrides are consulted first, falling back to a snapshot of the
//! ambient process environment. Overrides replace individual entries but
//! never drop the inherited set.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

/// Environment layered over an ambient snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    ambient: BTreeMap<OsString, OsString>,
    overrides: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// Snapshots the current process environment as the base layer.
    #[must_use]
    pub fn inherit() -> Self {
        Self::with_ambient(std::env::vars_os())
    }

    /// Uses the given variables as the base layer.
    #[must_use]
    pub fn with_ambient<I, K, V>(ambient: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            ambient: ambient
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            overrides: BTreeMap::new(),
        }
    }

    /// Sets an override, shadowing any inherited value for `key`.
    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> &mut Self {
        let _ = self.overrides.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`Environment::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        let _ = self.set(key, value);
        self
    }

    /// Looks `key` up in the overrides, then in the ambient snapshot.
    #[must_use]
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.overrides
            .get(key)
            .or_else(|| self.ambient.get(key))
            .map(OsString::as_os_str)
    }

    /// Flattens both layers into the mapping handed to the helper.
    #[must_use]
    pub fn materialize(&self) -> BTreeMap<OsString, OsString> {
        let mut flat = self.ambient.clone();
        flat.extend(
            self.overrides
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        flat
    }
}

impl<K, V> Extend<(K, V)> for Environment
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            let _ = self.set(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ambient() -> Environment {
        Environment::with_ambient([("PATH", "/bin"), ("HOME", "/root")])
    }

    #[test]
    fn override_shadows_inherited_value() {
        let env = ambient().with("HOME", "/home/alice");
        assert_eq!(env.get("HOME"), Some(OsStr::new("/home/alice")));
        assert_eq!(env.get("PATH"), Some(OsStr::new("/bin")));
    }

    #[test]
    fn materialize_keeps_inherited_set() {
        let mut env = ambient();
        env.extend([("HOME", "/home/alice"), ("LANG", "C")]);

        let flat = env.materialize();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[OsStr::new("PATH")], OsString::from("/bin"));
        assert_eq!(flat[OsStr::new("HOME")], OsString::from("/home/alice"));
        assert_eq!(flat[OsStr::new("LANG")], OsString::from("C"));
    }

    #[test]
    fn empty_overrides_materialize_to_ambient() {
        let flat = ambient().materialize();
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn inherit_snapshots_process_environment() {
        let env = Environment::inherit();
        assert_eq!(env.materialize().len(), std::env::vars_os().count());
    }

    #[test]
    fn missing_key_is_none() {
        assert_eq!(ambient().get("TERM"), None);
    }
}
