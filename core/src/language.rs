//Copyright 2024 Felix Engl
//
//Licensed under the Apache License, Version 2.0 (the "License");
//you may not use this file except in compliance with the License.
//You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
//Unless required by applicable law or agreed to in writing, software
//distributed under the License is distributed on an "AS IS" BASIS,
//WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//See the License for the specific language governing permissions and
//limitations under the License.

use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::str::FromStr;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

/// A language tag, lower-cased on construction so (language, feature-kind,
/// token) lookups are case-insensitive at the boundary.
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Language {
    inner: ArcStr,
}

impl Language {
    pub fn new(language: impl AsRef<str>) -> Self {
        Self {
            inner: ArcStr::from(language.as_ref().to_lowercase()),
        }
    }

    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    pub fn is<Q>(&self, value: &Q) -> bool
    where
        Q: ?Sized + PartialEq<Q>,
        Language: Borrow<Q>,
    {
        let q: &Q = self.borrow();
        q.eq(value)
    }
}

impl Hash for Language {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}

impl<T: AsRef<str>> From<T> for Language {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl Display for Language {
    delegate::delegate! {
        to self.inner {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result;
        }
    }
}

impl FromStr for Language {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl Borrow<str> for Language {
    #[inline(always)]
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Language {
    type Target = str;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
