use clap::{Args, Subcommand};

use ideaboard_db::object_id;

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[clap(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an object ID
    ///
    /// This is useful for writing fixtures or for other testing.
    MakeId(MakeId),
}

#[derive(Debug, Args)]
pub struct MakeId {
    #[clap(subcommand)]
    command: IdType,
}

#[derive(Debug, Subcommand)]
enum IdType {
    User,
    Resource,
    ApiKey,
    Activity,
    Note,
    Reference,
    Topic,
    Bookmark,
}

pub fn admin_commands(cmd: AdminArgs) {
    match cmd.commands {
        Commands::MakeId(MakeId { command }) => make_id(command),
    }
}

fn make_id(id: IdType) {
    let id = match id {
        IdType::User => object_id::UserId::new().to_string(),
        IdType::Resource => object_id::ResourceId::new().to_string(),
        IdType::ApiKey => object_id::ApiKeyId::new().to_string(),
        IdType::Activity => object_id::ActivityId::new().to_string(),
        IdType::Note => object_id::NoteId::new().to_string(),
        IdType::Reference => object_id::ReferenceId::new().to_string(),
        IdType::Topic => object_id::TopicId::new().to_string(),
        IdType::Bookmark => object_id::BookmarkId::new().to_string(),
    };

    println!("{id}");
}
