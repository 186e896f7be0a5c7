use anyhow::{anyhow, Result};

use crate::animation::{AnimationRegistry, AnimationStyle};
use crate::app::AppPaths;
use crate::cli::AnimationAction;
use crate::storage::StorageGateway;
use crate::wallpaper::Orientation;

pub fn cmd_animation(action: AnimationAction, paths: &AppPaths) -> Result<()> {
    let mut registry = AnimationRegistry::new(StorageGateway::in_dir(&paths.data_dir));
    registry.load();

    match action {
        AnimationAction::List => {
            for style in AnimationRegistry::catalog() {
                println!("{:<8} {}", style.id(), style.description());
            }
        }
        AnimationAction::Show => {
            for category in Orientation::ALL {
                println!(
                    "{}: {}",
                    category.display_name(),
                    registry.style_for(category).id()
                );
            }
        }
        AnimationAction::Set { category, style } => {
            let category = Orientation::parse(&category).ok_or_else(|| {
                anyhow!("unknown category '{}' (use landscape or portrait)", category)
            })?;
            let style = AnimationStyle::from_id(&style).ok_or_else(|| {
                let ids: Vec<_> = AnimationStyle::ALL.iter().map(|s| s.id()).collect();
                anyhow!("unknown style '{}' (available: {})", style, ids.join(", "))
            })?;

            registry.select(category, style);
            registry.persist();
            println!("✓ {} transition set to {}", category.display_name(), style.id());
        }
    }

    Ok(())
}
