use serde_json::json;

use crate::cli::{utils, Commands, OutputFormat};
use crate::client::ProfileClient;
use crate::models::{BlockInput, BlockKind, ImageSource, Profile};

pub async fn handle(cmd: Commands, mut client: ProfileClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let (profile, message) = match cmd {
        Commands::Show => (client.fetch().await?, None),

        Commands::AddLink { id, url, label, logo, color } => {
            let input = BlockInput {
                base_url: Some(url),
                display_label: label,
                logo,
                background_color: color,
                ..empty_input(&id, BlockKind::Link)
            };
            (client.add_block(input).await?, Some(format!("Added link block '{}'", id)))
        }

        Commands::AddText { id, content } => {
            let input = BlockInput {
                content: Some(content),
                ..empty_input(&id, BlockKind::Text)
            };
            (client.add_block(input).await?, Some(format!("Added text block '{}'", id)))
        }

        Commands::AddImage { id, file, label } => {
            let input = BlockInput {
                display_label: label,
                image: Some(ImageSource::Inline {
                    data: utils::read_image_file(&file)?,
                }),
                ..empty_input(&id, BlockKind::Image)
            };
            (client.add_block(input).await?, Some(format!("Added image block '{}'", id)))
        }

        Commands::Remove { id } => (client.remove_block(&id).await?, Some(format!("Removed block '{}'", id))),

        Commands::DisplayName { value } => (
            client.set_display_name(value).await?,
            Some("Display name updated".to_string()),
        ),

        Commands::Bio { value } => (client.set_bio(value).await?, Some("Bio updated".to_string())),

        Commands::Avatar { file } => (
            client.upload_avatar(&utils::read_image_file(&file)?).await?,
            Some("Avatar uploaded".to_string()),
        ),

        Commands::Init => anyhow::bail!("init runs against the store, not the API"),
    };

    match message {
        Some(message) => utils::output_success(&output_format, &message, Some(json!({ "profile": profile }))),
        None => output_profile(&output_format, &profile),
    }
}

fn empty_input(id: &str, kind: BlockKind) -> BlockInput {
    BlockInput {
        id: id.to_string(),
        kind,
        base_url: None,
        display_label: None,
        logo: None,
        background_color: None,
        content: None,
        location: None,
        image: None,
    }
}

fn output_profile(output_format: &OutputFormat, profile: &Profile) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(profile)?);
        }
        OutputFormat::Text => {
            println!("{}", profile.display_name.as_deref().unwrap_or(&profile.username));
            if let Some(bio) = &profile.bio {
                println!("{}", bio);
            }
            if let Some(avatar) = &profile.avatar {
                println!("Avatar: {}", avatar);
            }
            if profile.blocks.is_empty() {
                println!("No blocks");
            }
            for block in &profile.blocks {
                let detail = block
                    .base_url
                    .as_deref()
                    .or(block.content.as_deref())
                    .or(block.image_url.as_deref())
                    .unwrap_or("");
                println!("  [{}] {:<6} {}", block.id, block.kind.as_str(), detail);
            }
        }
    }
    Ok(())
}
