//! # Command Line
//!
//! Maps arguments to commands and shapes their output.
//!
//! ## Usage
//! ```text
//! innkeep-frontdesk room add <number> <type> <price>
//! innkeep-frontdesk room list
//! innkeep-frontdesk room price <room-id> <price>
//! innkeep-frontdesk item add <name> <category> <price>
//! innkeep-frontdesk item list
//! innkeep-frontdesk item update <id> [--name N] [--category C] [--price P]
//! innkeep-frontdesk item delete <id>
//! innkeep-frontdesk invoice create <draft.json | ->
//! innkeep-frontdesk invoice list
//! innkeep-frontdesk invoice show <id>
//! innkeep-frontdesk invoice render <id>
//! innkeep-frontdesk invoice delete <id>
//! innkeep-frontdesk report [--from YYYY-MM-DD] [--to YYYY-MM-DD]
//! innkeep-frontdesk config
//! ```
//!
//! Results print as JSON on stdout, except `invoice render`, which prints
//! the document itself.

use std::io::Read;
use std::path::PathBuf;

use chrono::NaiveDate;
use innkeep_core::{ItemCategory, ItemPatch, Money, NewItem, NewRoom, RoomType};
use serde_json::{json, Value};

use crate::commands::{catalog, invoice, report};
use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

pub const USAGE: &str = "\
Innkeep Front Desk

Usage: innkeep-frontdesk <COMMAND>

Commands:
  room add <number> <type> <price>        Add a room (type: Standard, Deluxe, Suite, ...)
  room list                               List rooms
  room price <room-id> <price>            Change a room's nightly rate
  item add <name> <category> <price>      Add a catalog item
  item list                               List items
  item update <id> [--name N] [--category C] [--price P]
  item delete <id>                        Remove an item
  invoice create <draft.json | ->         Price and save an invoice draft
  invoice list                            List invoices, newest first
  invoice show <id>                       Show one invoice
  invoice render <id>                     Print an invoice document
  invoice delete <id>                     Delete an invoice
  report [--from DATE] [--to DATE]        Revenue summary (dates: YYYY-MM-DD)
  config                                  Show the active configuration
  help                                    Show this message

Environment:
  INNKEEP_DB_PATH, INNKEEP_CONFIG, INNKEEP_HOTEL_NAME, INNKEEP_CURRENCY,
  INNKEEP_TAX_RATE, INNKEEP_STAY_POLICY, RUST_LOG";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    ShowConfig,
    AddRoom(NewRoom),
    ListRooms,
    SetRoomPrice { room_id: String, price: Money },
    AddItem(NewItem),
    ListItems,
    UpdateItem { id: String, patch: ItemPatch },
    DeleteItem { id: String },
    CreateInvoice { source: DraftSource },
    ListInvoices,
    ShowInvoice { id: String },
    RenderInvoice { id: String },
    DeleteInvoice { id: String },
    Report { from: Option<NaiveDate>, to: Option<NaiveDate> },
}

/// Where an invoice draft is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSource {
    Stdin,
    File(PathBuf),
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Json(Value),
    Text(String),
}

impl Command {
    /// Whether the command touches the database.
    pub fn needs_database(&self) -> bool {
        !matches!(self, Command::Help | Command::ShowConfig)
    }

    /// Parses arguments (without the program name).
    pub fn parse(args: &[String]) -> Result<Command, ApiError> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        match args.as_slice() {
            [] | ["help"] | ["--help"] | ["-h"] => Ok(Command::Help),
            ["config"] => Ok(Command::ShowConfig),

            ["room", "add", number, room_type, price] => Ok(Command::AddRoom(NewRoom {
                room_number: number.to_string(),
                room_type: room_type.parse::<RoomType>()?,
                price_per_night: price.parse::<Money>()?,
            })),
            ["room", "list"] => Ok(Command::ListRooms),
            ["room", "price", room_id, price] => Ok(Command::SetRoomPrice {
                room_id: room_id.to_string(),
                price: price.parse::<Money>()?,
            }),

            ["item", "add", name, category, price] => Ok(Command::AddItem(NewItem {
                name: name.to_string(),
                category: category.parse::<ItemCategory>()?,
                price: price.parse::<Money>()?,
            })),
            ["item", "list"] => Ok(Command::ListItems),
            ["item", "update", id, flags @ ..] => Ok(Command::UpdateItem {
                id: id.to_string(),
                patch: parse_item_patch(flags)?,
            }),
            ["item", "delete", id] => Ok(Command::DeleteItem { id: id.to_string() }),

            ["invoice", "create", "-"] => Ok(Command::CreateInvoice {
                source: DraftSource::Stdin,
            }),
            ["invoice", "create", path] => Ok(Command::CreateInvoice {
                source: DraftSource::File(PathBuf::from(path)),
            }),
            ["invoice", "list"] => Ok(Command::ListInvoices),
            ["invoice", "show", id] => Ok(Command::ShowInvoice { id: id.to_string() }),
            ["invoice", "render", id] => Ok(Command::RenderInvoice { id: id.to_string() }),
            ["invoice", "delete", id] => Ok(Command::DeleteInvoice { id: id.to_string() }),

            ["report", flags @ ..] => {
                let mut from = None;
                let mut to = None;
                for (flag, value) in flag_pairs(flags)? {
                    match flag {
                        "--from" => from = Some(parse_date(value)?),
                        "--to" => to = Some(parse_date(value)?),
                        other => return Err(unknown_flag(other)),
                    }
                }
                Ok(Command::Report { from, to })
            }

            _ => Err(ApiError::validation(format!(
                "unrecognized command: {}",
                args.join(" ")
            ))),
        }
    }
}

fn parse_item_patch(flags: &[&str]) -> Result<ItemPatch, ApiError> {
    let mut patch = ItemPatch::default();
    for (flag, value) in flag_pairs(flags)? {
        match flag {
            "--name" => patch.name = Some(value.to_string()),
            "--category" => patch.category = Some(value.parse::<ItemCategory>()?),
            "--price" => patch.price = Some(value.parse::<Money>()?),
            other => return Err(unknown_flag(other)),
        }
    }
    Ok(patch)
}

/// Splits `--flag value` pairs; a trailing flag without a value is an error.
fn flag_pairs<'a>(flags: &[&'a str]) -> Result<Vec<(&'a str, &'a str)>, ApiError> {
    flags
        .chunks(2)
        .map(|pair| match pair {
            [flag, value] => Ok((*flag, *value)),
            [flag] => Err(ApiError::validation(format!("{} needs a value", flag))),
            _ => Err(ApiError::validation("empty flag")),
        })
        .collect()
}

fn unknown_flag(flag: &str) -> ApiError {
    ApiError::validation(format!("unknown option: {}", flag))
}

fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(format!("invalid date '{}', expected YYYY-MM-DD", value)))
}

fn read_draft(source: &DraftSource) -> Result<invoice::InvoiceDraft, ApiError> {
    let text = match source {
        DraftSource::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| ApiError::internal(format!("Failed to read stdin: {}", e)))?;
            buf
        }
        DraftSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
            ApiError::validation(format!("Failed to read {}: {}", path.display(), e))
        })?,
    };

    serde_json::from_str(&text)
        .map_err(|e| ApiError::validation(format!("Invalid invoice draft: {}", e)))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Output, ApiError> {
    serde_json::to_value(value)
        .map(Output::Json)
        .map_err(|e| ApiError::internal(format!("Failed to encode response: {}", e)))
}

/// Runs a command that needs no database.
pub fn execute_offline(command: &Command, config: &ConfigState) -> Result<Output, ApiError> {
    match command {
        Command::ShowConfig => to_json(config),
        _ => Ok(Output::Text(USAGE.to_string())),
    }
}

/// Runs a command against the open database.
pub async fn execute(
    command: Command,
    db: &DbState,
    config: &ConfigState,
) -> Result<Output, ApiError> {
    match command {
        Command::Help | Command::ShowConfig => execute_offline(&command, config),

        Command::AddRoom(new_room) => to_json(catalog::create_room(db, new_room).await?),
        Command::ListRooms => to_json(catalog::list_rooms(db).await?),
        Command::SetRoomPrice { room_id, price } => {
            to_json(catalog::update_room_price(db, &room_id, price).await?)
        }

        Command::AddItem(new_item) => to_json(catalog::create_item(db, new_item).await?),
        Command::ListItems => to_json(catalog::list_items(db).await?),
        Command::UpdateItem { id, patch } => to_json(catalog::update_item(db, &id, patch).await?),
        Command::DeleteItem { id } => {
            catalog::delete_item(db, &id).await?;
            Ok(Output::Json(json!({ "deleted": id })))
        }

        Command::CreateInvoice { source } => {
            let draft = read_draft(&source)?;
            to_json(invoice::create_invoice(db, config, draft).await?)
        }
        Command::ListInvoices => to_json(invoice::list_invoices(db).await?),
        Command::ShowInvoice { id } => to_json(invoice::get_invoice(db, &id).await?),
        Command::RenderInvoice { id } => {
            let rendered = invoice::render_invoice(db, config, &id).await?;
            Ok(Output::Text(rendered.body))
        }
        Command::DeleteInvoice { id } => {
            invoice::delete_invoice(db, &id).await?;
            Ok(Output::Json(json!({ "deleted": id })))
        }

        Command::Report { from, to } => to_json(report::revenue_report(db, config, from, to).await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_room_add() {
        let cmd = Command::parse(&args("room add 204 deluxe 45.50")).unwrap();
        assert_eq!(
            cmd,
            Command::AddRoom(NewRoom {
                room_number: "204".to_string(),
                room_type: RoomType::Deluxe,
                price_per_night: Money::from_cents(4550),
            })
        );
        assert!(cmd.needs_database());
    }

    #[test]
    fn test_parse_item_update_flags() {
        let cmd = Command::parse(&args("item update item-1 --price 3 --category laundry")).unwrap();
        assert_eq!(
            cmd,
            Command::UpdateItem {
                id: "item-1".to_string(),
                patch: ItemPatch {
                    name: None,
                    category: Some(ItemCategory::Laundry),
                    price: Some(Money::from_cents(300)),
                },
            }
        );
    }

    #[test]
    fn test_parse_report_window() {
        let cmd = Command::parse(&args("report --from 2024-03-01")).unwrap();
        assert_eq!(
            cmd,
            Command::Report {
                from: NaiveDate::from_ymd_opt(2024, 3, 1),
                to: None,
            }
        );

        let err = Command::parse(&args("report --to 03/01/2024")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_parse_errors() {
        for line in [
            "room add 204 penthouse 10",
            "item add Tea Beverage 1.234",
            "item update item-1 --price",
            "item update item-1 --colour red",
            "checkout now",
        ] {
            let err = Command::parse(&args(line)).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError, "{}", line);
        }
    }

    #[test]
    fn test_help_and_config_are_offline() {
        assert_eq!(Command::parse(&[]).unwrap(), Command::Help);
        let config = Command::parse(&args("config")).unwrap();
        assert!(!config.needs_database());

        match execute_offline(&config, &ConfigState::default()).unwrap() {
            Output::Json(value) => assert_eq!(value["currency_prefix"], "Rs."),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invoice_create_from_file() {
        use innkeep_db::{Database, DbConfig};

        let db = DbState::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let config = ConfigState::default();

        let item = match execute(
            Command::parse(&args("item add Espresso Beverage 3")).unwrap(),
            &db,
            &config,
        )
        .await
        .unwrap()
        {
            Output::Json(value) => value,
            other => panic!("unexpected output: {:?}", other),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        let draft = json!({
            "withStay": false,
            "guestInfo": { "name": "Walk-in" },
            "items": [{ "itemId": item["id"], "quantity": 2 }],
            "taxRate": 10
        });
        std::fs::write(&path, draft.to_string()).unwrap();

        let created = execute(
            Command::CreateInvoice {
                source: DraftSource::File(path),
            },
            &db,
            &config,
        )
        .await
        .unwrap();
        let Output::Json(created) = created else {
            panic!("expected json");
        };
        assert_eq!(created["subtotal"], 600);
        assert_eq!(created["tax"], 60);
        assert_eq!(created["total"], 660);
        assert_eq!(created["roomInfo"]["kind"], "no_stay");

        let rendered = execute(
            Command::RenderInvoice {
                id: created["id"].as_str().unwrap().to_string(),
            },
            &db,
            &config,
        )
        .await
        .unwrap();
        match rendered {
            Output::Text(body) => assert!(body.contains("Rs. 6.60")),
            other => panic!("unexpected output: {:?}", other),
        }
    }
}
