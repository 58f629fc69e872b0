diesel::table! {
    tasks (id) {
        id -> BigInt,
        name -> Text,
        due_date -> Nullable<Date>,
        subject -> Nullable<Text>,
        priority -> Text,
        completed -> Bool,
        created_at -> Timestamp,
    }
}
