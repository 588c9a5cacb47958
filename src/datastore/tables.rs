#[allow(unused_imports)]
use diesel::sql_types::*;

table! {
    posts (id) {
        id -> Uuid,
        author -> Text,
        user_id -> Text,
        message -> Text,
        posted -> Timestamptz,
    }
}
