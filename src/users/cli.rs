use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde_json::json;

use crate::ui::prelude::*;

use super::api::UserApi;
use super::models::{Field, UserRecord};
use super::store::{Outcome, UserManager};

#[derive(Subcommand, Debug, Clone)]
pub enum UserCommands {
    /// Fetch and print all users
    List {
        /// Only show users whose name, email or phone contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Create a user
    Add(AddArgs),
    /// Update an existing user
    Edit(EditArgs),
    /// Delete a user by id
    Delete {
        /// Id of the user to delete
        id: u64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Id of the user to edit
    pub id: u64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
}

impl EditArgs {
    fn overrides(&self) -> Vec<(Field, &str)> {
        [
            (Field::Name, &self.name),
            (Field::Email, &self.email),
            (Field::Phone, &self.phone),
            (Field::Street, &self.street),
            (Field::City, &self.city),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

pub async fn handle_user_command(
    command: UserCommands,
    api: &dyn UserApi,
    lock_name_on_edit: bool,
) -> Result<()> {
    let mut manager = UserManager::new(lock_name_on_edit);

    match command {
        UserCommands::List { filter } => {
            if let Outcome::Loaded(count) =
                expect_outcome(manager.load_all(api).await, "fetch users")?
            {
                emit(
                    Level::Debug,
                    "users.list.fetched",
                    &format!("Fetched {count} users"),
                    None,
                );
            }
            let users = manager.filtered(filter.as_deref().unwrap_or(""));
            print_users(&users);
        }
        UserCommands::Add(args) => {
            // New ids are derived from the loaded collection
            expect_outcome(manager.load_all(api).await, "fetch users")?;
            manager.set_field(Field::Name, args.name);
            manager.set_field(Field::Email, args.email);
            manager.set_field(Field::Phone, args.phone);
            manager.set_field(Field::Street, args.street.unwrap_or_default());
            manager.set_field(Field::City, args.city.unwrap_or_default());

            let outcome = submit(&mut manager, api).await?;
            if let Outcome::Created(record) = outcome {
                print_saved("users.created", "Created", &record);
            }
        }
        UserCommands::Edit(args) => {
            expect_outcome(manager.load_all(api).await, "fetch users")?;
            let Some(record) = manager.find(args.id).cloned() else {
                bail!("No user with id {}", args.id);
            };
            manager.begin_edit(&record);

            for (field, value) in args.overrides() {
                if !manager.set_field(field, value) {
                    bail!(
                        "The {} field cannot be changed while editing",
                        field.as_str()
                    );
                }
            }

            let outcome = submit(&mut manager, api).await?;
            if let Outcome::Updated(record) = outcome {
                print_saved("users.updated", "Updated", &record);
            }
        }
        UserCommands::Delete { id } => {
            if let Outcome::Removed(id) =
                expect_outcome(manager.remove(api, id).await, "delete user")?
            {
                emit(
                    Level::Success,
                    "users.deleted",
                    &format!("Deleted user {id}"),
                    Some(json!({ "id": id })),
                );
            }
        }
    }

    Ok(())
}

async fn submit(manager: &mut UserManager, api: &dyn UserApi) -> Result<Outcome> {
    let outcome = manager.submit(api).await;
    if outcome == Outcome::Invalid {
        for (field, message) in manager.errors().iter() {
            emit(
                Level::Error,
                "users.validation",
                &format!("{}: {}", field.label(), message),
                Some(json!({ "field": field.as_str() })),
            );
        }
        bail!("Validation failed");
    }
    expect_outcome(outcome, "save user")
}

/// One-shot commands report failures through the exit code; the cause has
/// already been logged by the store.
fn expect_outcome(outcome: Outcome, action: &str) -> Result<Outcome> {
    match outcome {
        Outcome::Failed => bail!("Failed to {action}"),
        other => Ok(other),
    }
}

fn print_saved(code: &str, verb: &str, record: &UserRecord) {
    let data = serde_json::to_value(record).ok();
    emit(
        Level::Success,
        code,
        &format!("{verb} user {} ({})", record.id, record.name),
        data,
    );
}

fn print_users(users: &[&UserRecord]) {
    if get_output_format() == OutputFormat::Json {
        match serde_json::to_string_pretty(users) {
            Ok(out) => println!("{out}"),
            Err(err) => emit(
                Level::Error,
                "users.list.serialize",
                &format!("Failed to serialize users: {err}"),
                None,
            ),
        }
        return;
    }

    println!("{}", render_table(users));
}

fn render_table(users: &[&UserRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Name", "Email", "Phone", "City"]);

    for user in users {
        table.add_row(vec![
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.phone.clone(),
            user.address.city.clone(),
        ]);
    }

    table
}
