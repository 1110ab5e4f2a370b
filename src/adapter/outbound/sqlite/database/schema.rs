// Diesel table definitions matching `migrations/vault` and `migrations/jobs`.

diesel::table! {
    users (id) {
        id -> Nullable<Integer>,
        tg_id -> BigInt,
        first_seen -> Text,
        last_active -> Text,
    }
}

diesel::table! {
    sessions (id) {
        id -> Text,
        owner_id -> BigInt,
        title -> Text,
        created_at -> Text,
        expires_at -> Nullable<Text>,
        auto_delete_minutes -> Integer,
        protect_content -> Bool,
        revoked -> Bool,
        force_join_channel -> Nullable<Text>,
    }
}

diesel::table! {
    files (id) {
        id -> Nullable<Integer>,
        session_id -> Text,
        upload_channel_msg_id -> Integer,
        file_type -> Text,
        file_id -> Nullable<Text>,
        file_unique_id -> Nullable<Text>,
        mime -> Nullable<Text>,
        caption -> Nullable<Text>,
        added_at -> Text,
    }
}

diesel::table! {
    settings (key) {
        key -> Text,
        value -> Text,
    }
}

diesel::table! {
    channels (alias) {
        alias -> Text,
        link -> Text,
    }
}

diesel::table! {
    jobs (id) {
        id -> Text,
        session_id -> Text,
        user_tg_id -> BigInt,
        chat_id -> BigInt,
        message_id -> Integer,
        run_at -> Text,
        created_at -> Text,
    }
}

diesel::joinable!(files -> sessions (session_id));

diesel::allow_tables_to_appear_in_same_query!(users, sessions, files, settings, channels,);
