use crate::identity::{Author, Resolver, SubmitForm};
use crate::twoface::Fallible;
use async_trait::async_trait;

/// Takes the form's word for who wrote the post. Posts it resolves never carry a subject id,
/// and a blank name becomes the configured stand-in.
#[derive(Clone, Debug)]
pub struct FormResolver {
    anonymous: String,
}

impl FormResolver {
    pub fn new(anonymous: impl Into<String>) -> Self {
        Self {
            anonymous: anonymous.into(),
        }
    }
}

#[async_trait(?Send)]
impl Resolver for FormResolver {
    async fn resolve(&self, form: &SubmitForm) -> Fallible<Author> {
        let name = match form.name() {
            "" => self.anonymous.clone(),
            name => name.to_owned(),
        };
        Ok(Author {
            name,
            user_id: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> FormResolver {
        FormResolver::new("Anonymous Crab")
    }

    #[actix_rt::test]
    async fn test_given_name_is_kept() {
        let form = SubmitForm {
            name: Some("Edna".to_owned()),
            ..Default::default()
        };
        let author = resolver().resolve(&form).await.unwrap();
        assert_eq!(author.name, "Edna");
        assert_eq!(author.user_id, "");
    }

    #[actix_rt::test]
    async fn test_blank_name_becomes_the_stand_in() {
        for form in vec![
            SubmitForm::default(),
            SubmitForm {
                name: Some(String::new()),
                ..Default::default()
            },
        ] {
            let author = resolver().resolve(&form).await.unwrap();
            assert_eq!(author.name, "Anonymous Crab");
            assert_eq!(author.user_id, "");
        }
    }
}
