use clap::Args;
use serde_json::Value;
use std::fs;

use home_finance_core::listings::editor::PostView;
use home_finance_core::listings::post::{PostField, PropertyPost};

use crate::input;

/// Arguments for editing a property post
#[derive(Args)]
pub struct ListingEditArgs {
    /// Path to the post JSON (falls back to stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Id of the user making the edit
    #[arg(long)]
    pub user: String,

    /// Field edit as field=value (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub edits: Vec<String>,

    /// Write the saved post to this path
    #[arg(long)]
    pub save: Option<String>,
}

pub fn run_listing_edit(args: ListingEditArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let post: PropertyPost = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <post.json> or stdin required for listing edits".into());
    };

    if args.edits.is_empty() {
        return Err("at least one --set field=value is required".into());
    }

    let mut view = PostView::open(post);
    view.begin_edit(Some(&args.user))?;

    for edit in &args.edits {
        let (field, value) = edit
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got '{edit}'"))?;
        let field: PostField = field.parse()?;
        view.update_draft(field, value)?;
    }

    let saved = view.commit(|post| -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref path) = args.save {
            fs::write(path, serde_json::to_string_pretty(post)?)?;
        }
        Ok(())
    })?;

    Ok(serde_json::json!({
        "result": saved,
        "methodology": "Author edit of property post",
        "warnings": [],
    }))
}
