//! Table definitions for the latest schema revision.
//!
//! Tables are listed in creation order. Foreign keys always use
//! `ON UPDATE NO ACTION`; usernames and generated ids are immutable.

use super::{ColumnDef, ColumnDefault, ColumnType, FkAction, ForeignKeyDef, TableDef};
use crate::db::sequence::Sequence;

use ColumnType::{Boolean, Integer, Json, Real, Text, Timestamp};

const NOW: ColumnDefault = ColumnDefault::CurrentTimestamp;
const EMPTY_TEXT: ColumnDefault = ColumnDefault::Literal("''");
const EMPTY_ARRAY: ColumnDefault = ColumnDefault::Literal("'[]'");
const EMPTY_OBJECT: ColumnDefault = ColumnDefault::Literal("'{}'");
const ZERO: ColumnDefault = ColumnDefault::Literal("0");
const FALSE: ColumnDefault = ColumnDefault::Literal("0");
const TRUE: ColumnDefault = ColumnDefault::Literal("1");

const fn required(name: &'static str, column_type: ColumnType) -> ColumnDef {
    ColumnDef {
        name,
        column_type,
        nullable: false,
        default: None,
    }
}

const fn optional(name: &'static str, column_type: ColumnType) -> ColumnDef {
    ColumnDef {
        name,
        column_type,
        nullable: true,
        default: None,
    }
}

const fn required_or(
    name: &'static str,
    column_type: ColumnType,
    default: ColumnDefault,
) -> ColumnDef {
    ColumnDef {
        name,
        column_type,
        nullable: false,
        default: Some(default),
    }
}

const fn optional_or(
    name: &'static str,
    column_type: ColumnType,
    default: ColumnDefault,
) -> ColumnDef {
    ColumnDef {
        name,
        column_type,
        nullable: true,
        default: Some(default),
    }
}

const fn references(
    column: &'static str,
    parent_table: &'static str,
    parent_column: &'static str,
    on_delete: FkAction,
) -> ForeignKeyDef {
    ForeignKeyDef {
        column,
        parent_table,
        parent_column,
        on_delete,
        on_update: FkAction::NoAction,
    }
}

const fn account_fk(column: &'static str, on_delete: FkAction) -> ForeignKeyDef {
    references(column, "account", "username", on_delete)
}

pub const ACCOUNT: TableDef = TableDef {
    name: "account",
    columns: &[
        required("username", Text),
        optional("password_hash", Text),
        optional("email", Text),
        optional_or("interests", Json, EMPTY_OBJECT),
        optional("favorite", Json),
        optional("name", Text),
        optional("image_url", Json),
        optional("occupation", Text),
        optional_or("join_date", Timestamp, NOW),
        optional("following_allow", Boolean),
        optional("subscriptions", Json),
        optional("is_social_notification", Boolean),
    ],
    primary_key: &["username"],
    foreign_keys: &[],
    append_only: false,
};

pub const DEVICE: TableDef = TableDef {
    name: "device_info",
    columns: &[
        optional("device_id", Text),
        optional("username", Text),
        optional("locale_timestamp", Timestamp),
        required("device_token", Text),
    ],
    primary_key: &["device_token"],
    foreign_keys: &[],
    append_only: false,
};

pub const FOLLOWER: TableDef = TableDef {
    name: "follower",
    columns: &[
        required_or("id", Integer, ColumnDefault::RowId),
        required("follower", Text),
        required("following", Text),
        required_or("fellow", Boolean, FALSE),
        required_or("accept_status", Boolean, FALSE),
        optional_or("timestamp", Timestamp, NOW),
        required_or("declined", Boolean, FALSE),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    append_only: false,
};

pub const EMAIL_NOTIFICATION: TableDef = TableDef {
    name: "email_notification",
    columns: &[
        required("username", Text),
        required("push_notification_day", Text),
        required("enable", Boolean),
    ],
    primary_key: &["username"],
    foreign_keys: &[account_fk("username", FkAction::Cascade)],
    append_only: false,
};

pub const PUSH_NOTIFICATION_TYPES: TableDef = TableDef {
    name: "push_notification_types",
    columns: &[
        required("type", Text),
        required("general_type", Text),
        required_or("allowed_days", Json, EMPTY_ARRAY),
        required_or("allowed_frequency", Json, EMPTY_ARRAY),
        required_or("allowed_graph_count", Json, EMPTY_ARRAY),
    ],
    primary_key: &["type"],
    foreign_keys: &[],
    append_only: false,
};

pub const PUSH_NOTIFICATION_SETTINGS: TableDef = TableDef {
    name: "push_notification_settings",
    columns: &[
        required("username", Text),
        required("type", Text),
        required("frequency", Text),
        required("notification_days", Json),
        optional("notification_graph_count", Integer),
        required_or("notification_time", Text, ColumnDefault::Literal("'14:00'")),
        required("enable", Boolean),
    ],
    primary_key: &["username", "type"],
    foreign_keys: &[
        account_fk("username", FkAction::Cascade),
        references("type", "push_notification_types", "type", FkAction::Cascade),
    ],
    append_only: false,
};

pub const BOARD: TableDef = TableDef {
    name: "board",
    columns: &[
        required_or("id", Text, ColumnDefault::Sequence(Sequence::Board)),
        required("name", Text),
        optional("owner", Text),
        required_or("members", Json, EMPTY_ARRAY),
        required_or("preview_img_url", Text, EMPTY_TEXT),
        optional_or("graphs_count", Integer, ZERO),
        optional("privacy", Text),
        required_or("timestamp", Timestamp, NOW),
    ],
    primary_key: &["id"],
    foreign_keys: &[account_fk("owner", FkAction::Cascade)],
    append_only: false,
};

pub const SUBSCRIPTION: TableDef = TableDef {
    name: "subscription",
    columns: &[
        required("username", Text),
        required("name", Text),
        required_or("link", Text, EMPTY_TEXT),
        required_or("description", Text, EMPTY_TEXT),
        optional("demo_board_id", Text),
        optional("purchase_id", Text),
        optional("subscription_folder_id", Text),
        optional("price", Real),
    ],
    primary_key: &["username"],
    foreign_keys: &[
        account_fk("username", FkAction::Cascade),
        references("demo_board_id", "board", "id", FkAction::NoAction),
    ],
    append_only: false,
};

pub const SPACES: TableDef = TableDef {
    name: "spaces",
    columns: &[
        required("id", Text),
        optional("subscription", Text),
        required_or("name", Text, EMPTY_TEXT),
        required_or("link_disable", Text, EMPTY_TEXT),
        required_or("link_active", Text, EMPTY_TEXT),
    ],
    primary_key: &["id"],
    foreign_keys: &[references(
        "subscription",
        "subscription",
        "username",
        FkAction::Cascade,
    )],
    append_only: false,
};

pub const TRIAL_PERIODS: TableDef = TableDef {
    name: "trial_periods",
    columns: &[
        required("username", Text),
        required("subscription", Text),
        required("until_timestamp", Timestamp),
    ],
    primary_key: &["username"],
    foreign_keys: &[],
    append_only: false,
};

pub const PAYMENT: TableDef = TableDef {
    name: "payment",
    columns: &[
        required("user_id", Text),
        optional("environment", Text),
        optional("notification_type", Text),
        optional("original_transaction_id", Text),
        optional("latest_expires_date", Timestamp),
        required_or("is_subscribed", Boolean, TRUE),
        optional("will_auto_renew", Boolean),
        optional("cancellation_date", Timestamp),
        optional("latest_receipt", Text),
        optional("latest_expired_receipt", Text),
        optional("transaction_id", Text),
        optional("auto_renew_product_id", Text),
        optional("promotional_offer_id", Text),
        optional("product_id", Text),
        optional("web_order_line_item_id", Text),
        optional("is_intro_period", Boolean),
        optional("is_trial_period", Boolean),
        required_or("insert_timestamp", Timestamp, NOW),
    ],
    primary_key: &["user_id"],
    foreign_keys: &[],
    append_only: false,
};

pub const GRAPH: TableDef = TableDef {
    name: "graph",
    columns: &[
        required_or("id", Text, ColumnDefault::Sequence(Sequence::Graph)),
        required_or("name", Text, EMPTY_TEXT),
        required("location", Text),
        optional("location_id", Text),
        required("link_small", Json),
        required("link_medium", Json),
        required("link_large", Json),
        required("owner", Json),
        required_or("source", Text, EMPTY_TEXT),
        required_or("description", Text, EMPTY_TEXT),
        optional("parent", Text),
        required_or("publish_date", Timestamp, NOW),
        required_or("timestamp", Timestamp, NOW),
        required_or("article_link", Text, EMPTY_TEXT),
        optional("publisher", Text),
        optional("mongo_id", Text),
        optional("graph_type", Text),
        required_or("shifts", Json, EMPTY_ARRAY),
        required_or("industries", Json, EMPTY_ARRAY),
        required_or("upvote", Integer, ZERO),
    ],
    primary_key: &["id"],
    foreign_keys: &[account_fk("publisher", FkAction::NoAction)],
    append_only: false,
};

pub const TAG: TableDef = TableDef {
    name: "tag",
    columns: &[
        required("value", Text),
        required("graph_id", Text),
        required("author", Text),
    ],
    primary_key: &["value", "graph_id", "author"],
    foreign_keys: &[
        references("graph_id", "graph", "id", FkAction::Cascade),
        account_fk("author", FkAction::Cascade),
    ],
    append_only: false,
};

pub const INTRINIO_DUMP: TableDef = TableDef {
    name: "intrinio_dump",
    columns: &[
        required("ticker", Text),
        optional("name", Text),
        optional("last_price", Real),
        optional("market_cap", Real),
        optional("pe_ratio", Real),
        optional("dividend_yield", Real),
        optional("fifty_two_week_high", Real),
        optional("fifty_two_week_low", Real),
        optional("volume", Integer),
        required_or("data", Json, EMPTY_OBJECT),
        required_or("timestamp", Timestamp, NOW),
    ],
    primary_key: &["ticker"],
    foreign_keys: &[],
    append_only: false,
};

pub const EQUITY: TableDef = TableDef {
    name: "equity",
    columns: &[
        required("ticker", Text),
        required("name", Text),
        optional("trend_1", Text),
        optional("trend_2", Text),
        optional("trend_3", Text),
        required_or("timestamp", Timestamp, NOW),
        required_or("tags", Json, EMPTY_ARRAY),
    ],
    primary_key: &["ticker"],
    foreign_keys: &[references(
        "ticker",
        "intrinio_dump",
        "ticker",
        FkAction::Cascade,
    )],
    append_only: false,
};

pub const EXPOSED_EQUITY: TableDef = TableDef {
    name: "exposed_equity",
    columns: &[
        required("equity_id", Text),
        required("graph_id", Text),
        required("author", Text),
    ],
    primary_key: &["equity_id", "graph_id", "author"],
    foreign_keys: &[
        references("equity_id", "equity", "ticker", FkAction::Cascade),
        references("graph_id", "graph", "id", FkAction::Cascade),
        account_fk("author", FkAction::Cascade),
    ],
    append_only: false,
};

pub const PROS_AND_CONS: TableDef = TableDef {
    name: "pros_and_cons",
    columns: &[
        required("id", Text),
        required("name", Text),
        optional("theme", Text),
        optional("ticker", Text),
        optional("graph_id", Text),
        optional("author", Text),
        required_or("is_active", Boolean, TRUE),
        required_or("graphs", Json, EMPTY_ARRAY),
        required_or("count_pros", Integer, ZERO),
        required_or("count_cons", Integer, ZERO),
    ],
    primary_key: &["id"],
    foreign_keys: &[
        references("graph_id", "graph", "id", FkAction::Cascade),
        account_fk("author", FkAction::Cascade),
    ],
    append_only: false,
};

pub const PROS_AND_CONS_SELECT: TableDef = TableDef {
    name: "pros_and_cons_select",
    columns: &[
        required("id", Text),
        required("pros_and_cons_id", Text),
        required("vote_author", Text),
        required("value", Boolean),
    ],
    primary_key: &["id"],
    foreign_keys: &[
        references("pros_and_cons_id", "pros_and_cons", "id", FkAction::Cascade),
        account_fk("vote_author", FkAction::Cascade),
    ],
    append_only: false,
};

pub const PC_ARGUMENTS: TableDef = TableDef {
    name: "pc_arguments",
    columns: &[required("argument", Text), optional("category", Text)],
    primary_key: &["argument"],
    foreign_keys: &[references(
        "argument",
        "pros_and_cons",
        "name",
        FkAction::Cascade,
    )],
    append_only: false,
};

pub const INTERESTS: TableDef = TableDef {
    name: "interests",
    columns: &[
        required_or("id", Integer, ColumnDefault::RowId),
        required("name", Text),
        optional("category", Text),
        required_or("link_active_small", Text, EMPTY_TEXT),
        required_or("link_active_medium", Text, EMPTY_TEXT),
        required_or("link_active_large", Text, EMPTY_TEXT),
        required_or("link_disable_small", Text, EMPTY_TEXT),
        required_or("link_disable_medium", Text, EMPTY_TEXT),
        required_or("link_disable_large", Text, EMPTY_TEXT),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    append_only: false,
};

pub const BLOCKED_USER: TableDef = TableDef {
    name: "blocked_user",
    columns: &[
        required_or("id", Integer, ColumnDefault::RowId),
        required("username", Text),
        required("blocked_username", Text),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    append_only: false,
};

pub const TEMPORARY_PASS: TableDef = TableDef {
    name: "temporary_pass",
    columns: &[
        required_or("id", Integer, ColumnDefault::RowId),
        required("username", Text),
        required("email", Text),
        required("temp_pass", Text),
        required_or(
            "valid_until",
            Timestamp,
            ColumnDefault::CurrentTimestampPlusDay,
        ),
    ],
    primary_key: &["id"],
    foreign_keys: &[account_fk("username", FkAction::Cascade)],
    append_only: false,
};

pub const ACCESS_DATA: TableDef = TableDef {
    name: "access_data",
    columns: &[
        required_or("id", Integer, ColumnDefault::RowId),
        required("username", Text),
        optional("login_timestamp", Timestamp),
        optional("logout_timestamp", Timestamp),
        optional("password_change_timestamp", Timestamp),
    ],
    primary_key: &["id"],
    foreign_keys: &[account_fk("username", FkAction::Cascade)],
    append_only: true,
};

pub const EXPOSED_EQUITY_FIELDS: TableDef = TableDef {
    name: "exposed_equity_fields",
    columns: &[
        required("equity_ticker", Text),
        required("username", Text),
        required_or("fields", Json, EMPTY_OBJECT),
    ],
    primary_key: &["equity_ticker", "username"],
    foreign_keys: &[account_fk("username", FkAction::Cascade)],
    append_only: false,
};

/// Every record table, in creation order. The internal `sequences` table is
/// not a record table and is not listed.
pub const ALL_TABLES: &[&TableDef] = &[
    &ACCOUNT,
    &DEVICE,
    &FOLLOWER,
    &EMAIL_NOTIFICATION,
    &PUSH_NOTIFICATION_TYPES,
    &PUSH_NOTIFICATION_SETTINGS,
    &BOARD,
    &SUBSCRIPTION,
    &SPACES,
    &TRIAL_PERIODS,
    &PAYMENT,
    &GRAPH,
    &TAG,
    &INTRINIO_DUMP,
    &EQUITY,
    &EXPOSED_EQUITY,
    &PROS_AND_CONS,
    &PROS_AND_CONS_SELECT,
    &PC_ARGUMENTS,
    &INTERESTS,
    &BLOCKED_USER,
    &TEMPORARY_PASS,
    &ACCESS_DATA,
    &EXPOSED_EQUITY_FIELDS,
];

/// Looks up one table definition by SQL name.
pub fn table(name: &str) -> Option<&'static TableDef> {
    ALL_TABLES.iter().copied().find(|table| table.name == name)
}
