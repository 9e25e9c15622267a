//! Blog schema evolution example.
//!
//! Declares the blog tables through [`Model`] descriptors, pretends the
//! database still has an older layout and prints the script bringing it up
//! to date.
//!
//! Run with: cargo run --example blog_schema -p quarry-migrate

use quarry_migrate::prelude::*;
use quarry_sql_core::schema::{Column, ColumnType, Database, FieldKind, Indexes, Model, Table};
use quarry_sql_postgres::PostgresDialect;

struct Author;

impl Model for Author {
    fn table_name() -> &'static str {
        "t_author"
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("f_id", ColumnType::new(FieldKind::Uint64).autoincrement()).field("ID"),
            Column::new("f_name", ColumnType::new(FieldKind::String).size(100)).field("Name"),
            Column::new("f_email", ColumnType::new(FieldKind::String).null()).field("Email"),
        ]
    }

    fn primary_key() -> Vec<&'static str> {
        vec!["ID"]
    }

    fn unique_indexes() -> Indexes {
        Indexes::from([("i_email", vec!["Email"])])
    }
}

struct Post;

impl Model for Post {
    fn table_name() -> &'static str {
        "t_post"
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("f_id", ColumnType::new(FieldKind::Uint64).autoincrement()).field("ID"),
            Column::new("f_author_id", ColumnType::new(FieldKind::Uint64)).field("AuthorID"),
            Column::new("f_title", ColumnType::new(FieldKind::String).size(200)).field("Title"),
            Column::new("f_body", ColumnType::new(FieldKind::String).size(65535)).field("Body"),
            Column::new(
                "f_content",
                ColumnType::new(FieldKind::String).rename_to("f_body"),
            )
            .field("Content"),
            Column::new("f_published", ColumnType::new(FieldKind::Bool).default("false"))
                .field("Published"),
            Column::new(
                "f_created_at",
                ColumnType::new(FieldKind::Time).default("CURRENT_TIMESTAMP"),
            )
            .field("CreatedAt"),
        ]
    }

    fn primary_key() -> Vec<&'static str> {
        vec!["ID"]
    }

    fn indexes() -> Indexes {
        Indexes::from([("i_author", vec!["AuthorID"]), ("i_created/brin", vec!["CreatedAt"])])
    }
}

/// What the database looked like before: posts stored their text in
/// `f_content` and had no publication flag.
fn observed() -> Database {
    let db = Database::new("blog");
    db.register::<Author>();

    let mut post = Table::new("t_post");
    post.add_col(
        Column::new("f_id", ColumnType::new(FieldKind::Uint64).autoincrement()).field("ID"),
    );
    post.add_col(Column::new("f_author_id", ColumnType::new(FieldKind::Uint64)).field("AuthorID"));
    post.add_col(
        Column::new("f_title", ColumnType::new(FieldKind::String).size(120)).field("Title"),
    );
    post.add_col(
        Column::new("f_content", ColumnType::new(FieldKind::String).size(65535))
            .field("Content"),
    );
    post.add_col(
        Column::new("f_created_at", ColumnType::new(FieldKind::Time).default("CURRENT_TIMESTAMP"))
            .field("CreatedAt"),
    );
    post.add_key(quarry_sql_core::Key::primary(["ID"]));
    post.add_key(quarry_sql_core::Key::index("i_title").fields(["Title"]));
    db.add_table(post);
    db
}

fn main() -> Result<()> {
    let desired = Database::new("blog");
    desired.register::<Author>();
    desired.register::<Post>();

    let dialect = PostgresDialect::new();

    println!("=== Fresh database ===\n");
    print!("{}", migrate(&desired, &Empty, &dialect)?);

    println!("\n=== Upgrading the previous layout ===\n");
    let plan = migrate(&desired, &observed(), &dialect)?;
    print!("{plan}");

    println!("\n=== After upgrading ===\n");
    let again = migrate(&desired, &desired, &dialect)?;
    println!("up to date: {}", again.is_empty());
    Ok(())
}
