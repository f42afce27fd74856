use anyhow::{bail, Context, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// An untyped (JSON) Object from which [TypedParameters](TypedParameter) can be parsed.
///
/// Can represent the parameters of an authorization request (from a query string or from
/// the claims of a request object), provider metadata or a UserInfo response.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UntypedObject(pub(crate) Map<String, Json>);

/// A strongly typed parameter that can represent metadata entries or request parameters.
pub trait TypedParameter: TryFrom<Json, Error = anyhow::Error> + Into<Json> + Clone + std::fmt::Debug {
    const KEY: &'static str;
}

impl UntypedObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `application/x-www-form-urlencoded` parameters into string members.
    ///
    /// Parameters sent without a value are treated as omitted. A parameter included more
    /// than once is an error (RFC 6749 Section 3.1).
    pub fn from_query(query: &str) -> Result<Self> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(query).context("unable to parse query parameters")?;
        let mut map = Map::new();
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            if map.contains_key(&key) {
                bail!("parameter '{key}' is included more than once")
            }
            map.insert(key, Json::String(value));
        }
        Ok(Self(map))
    }

    /// Flatten into string parameters. Strings are emitted as-is, `null` members are
    /// skipped and any other value is emitted as compact JSON text.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(key, value)| match value {
                Json::Null => None,
                Json::String(s) => Some((key.clone(), s.clone())),
                other => Some((key.clone(), other.to_string())),
            })
            .collect()
    }

    /// Encode as an `application/x-www-form-urlencoded` string.
    pub fn to_query(&self) -> Result<String> {
        serde_urlencoded::to_string(self.to_pairs()).context("unable to encode query parameters")
    }

    /// Get a [TypedParameter] from the Object or return the default value.
    ///
    /// Note that this method clones the underlying data.
    pub fn get_or_default<T: TypedParameter + Default>(&self) -> Result<T> {
        Ok(self
            .0
            .get(T::KEY)
            .cloned()
            .map(TryInto::try_into)
            .transpose()?
            .unwrap_or_default())
    }

    /// Get a [TypedParameter] from the Object.
    ///
    /// Note that this method clones the underlying data.
    pub fn get<T: TypedParameter>(&self) -> Option<Result<T>> {
        Some(self.0.get(T::KEY)?.clone().try_into())
    }

    /// Get a raw member of the Object.
    pub fn get_raw(&self, key: &str) -> Option<&Json> {
        self.0.get(key)
    }

    /// Remove a [TypedParameter] from the Object.
    pub fn remove<T: TypedParameter>(&mut self) -> Option<Result<T>> {
        Some(self.0.remove(T::KEY)?.try_into())
    }

    /// Insert a [TypedParameter].
    ///
    /// Returns the existing [TypedParameter] if one already exists.
    ///
    /// # Errors
    /// Returns an error if there was already an entry in the Object, but it could not be parsed from JSON.
    pub fn insert<T: TypedParameter>(&mut self, t: T) -> Option<Result<T>> {
        Some(self.0.insert(T::KEY.to_owned(), t.into())?.try_into())
    }

    /// Insert an optional [TypedParameter], doing nothing for `None`.
    pub fn insert_opt<T: TypedParameter>(&mut self, t: Option<T>) {
        if let Some(t) = t {
            let _ = self.insert(t);
        }
    }

    /// Insert a raw member, returning the replaced value.
    pub fn insert_raw(&mut self, key: impl Into<String>, value: Json) -> Option<Json> {
        self.0.insert(key.into(), value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Json)> {
        self.0.iter()
    }

    /// Overlay the members of `other` on top of this Object; members of `other` win.
    pub fn overlay(mut self, other: UntypedObject) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn into_inner(self) -> Map<String, Json> {
        self.0
    }
}

impl From<Map<String, Json>> for UntypedObject {
    fn from(value: Map<String, Json>) -> Self {
        Self(value)
    }
}

impl From<UntypedObject> for Json {
    fn from(value: UntypedObject) -> Self {
        value.0.into()
    }
}

impl TryFrom<Json> for UntypedObject {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let Json::Object(map) = value else {
            bail!("expected a JSON object")
        };
        Ok(Self(map))
    }
}

pub trait ParsingErrorContext {
    type T: TypedParameter;

    fn parsing_error(self) -> Result<Self::T>;
}

impl<T: TypedParameter> ParsingErrorContext for Option<Result<T>> {
    type T = T;

    fn parsing_error(self) -> Result<T> {
        self.context(format!("'{}' is missing", T::KEY))?
            .context(format!("'{}' could not be parsed", T::KEY))
    }
}

impl<T: TypedParameter> ParsingErrorContext for Result<T> {
    type T = T;

    fn parsing_error(self) -> Result<T> {
        self.context(format!("'{}' could not be parsed", T::KEY))
    }
}
