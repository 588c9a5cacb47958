//! Deciding who a submission is from. The board handlers don't care how: they call whichever
//! `Resolver` was injected at startup. Deployments that verify ID tokens get `token::TokenResolver`;
//! test deployments that trust the form get `form::FormResolver`.

pub mod form;
pub mod keys;
pub mod token;

use crate::twoface::Fallible;
use async_trait::async_trait;
use serde::Deserialize;

/// Fields of the board's submit form. Missing fields read as empty, like the blank values an
/// empty HTML input submits.
#[derive(Deserialize, Debug, Default)]
pub struct SubmitForm {
    pub name: Option<String>,
    pub message: Option<String>,
    pub token: Option<String>,
}

impl SubmitForm {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or("")
    }
}

/// Who a post gets credited to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Display name. May be empty when a verified profile carries no name.
    pub name: String,
    /// Verified subject id, or empty when nothing was verified.
    pub user_id: String,
}

#[async_trait(?Send)]
/// The interface for resolving a submission's authorship.
pub trait Resolver: Clone {
    async fn resolve(&self, form: &SubmitForm) -> Fallible<Author>;
}
