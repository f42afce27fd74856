use anyhow::{bail, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::ops::Deref;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(try_from = "Vec<T>", into = "Vec<T>")]
pub struct NonEmptyVec<T: Clone>(Vec<T>);

impl<T: Clone> NonEmptyVec<T> {
    pub fn new(t: T) -> Self {
        Self(vec![t])
    }

    pub fn maybe_new(v: Vec<T>) -> Option<Self> {
        Self::try_from(v).ok()
    }

    pub fn push(&mut self, t: T) {
        self.0.push(t)
    }

    pub fn first(&self) -> &T {
        &self.0[0]
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T: Clone> TryFrom<Vec<T>> for NonEmptyVec<T> {
    type Error = Error;

    fn try_from(v: Vec<T>) -> Result<NonEmptyVec<T>, Error> {
        if v.is_empty() {
            bail!("cannot create a NonEmptyVec from an empty Vec")
        }
        Ok(NonEmptyVec(v))
    }
}

impl<T: Clone> From<NonEmptyVec<T>> for Vec<T> {
    fn from(NonEmptyVec(v): NonEmptyVec<T>) -> Vec<T> {
        v
    }
}

impl<T: Clone> AsRef<[T]> for NonEmptyVec<T> {
    fn as_ref(&self) -> &[T] {
        &self.0
    }
}

impl<T: Clone> Deref for NonEmptyVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

/// Read the tokens of a space-delimited parameter.
///
/// Query parameters carry the list as one string; request objects and metadata may carry a
/// JSON array of strings instead, which is accepted too.
pub(crate) fn space_delimited(value: Json) -> Result<Vec<String>> {
    match value {
        Json::String(s) => Ok(s.split_whitespace().map(ToOwned::to_owned).collect()),
        Json::Array(xs) => xs
            .into_iter()
            .map(|x| match x {
                Json::String(s) => Ok(s),
                other => bail!("expected a string, found {other}"),
            })
            .collect(),
        other => bail!("expected a space-delimited string, found {other}"),
    }
}

/// Join tokens into a space-delimited parameter value.
pub(crate) fn join_space_delimited<I, S>(tokens: I) -> Json
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Json::String(
        tokens
            .into_iter()
            .map(|t| t.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn space_delimited_accepts_string_and_array() {
        assert_eq!(
            space_delimited(json!("openid  email")).unwrap(),
            vec!["openid", "email"]
        );
        assert_eq!(
            space_delimited(json!(["openid", "email"])).unwrap(),
            vec!["openid", "email"]
        );
        assert!(space_delimited(json!(42)).is_err());
        assert!(space_delimited(json!(["openid", 1])).is_err());
    }

    #[test]
    fn non_empty_vec_rejects_empty() {
        assert!(NonEmptyVec::<String>::maybe_new(vec![]).is_none());
        let v = NonEmptyVec::new("urn:x".to_string());
        assert_eq!(v.first(), "urn:x");
    }
}
