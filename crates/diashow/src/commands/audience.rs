use anyhow::Result;
use colored::Colorize;

use crate::store::{LiveHeadStore, ViewerPosition};

pub fn run(store: &dyn LiveHeadStore) -> Result<()> {
    let positions = store.viewer_positions()?;
    if positions.is_empty() {
        println!("{}", "No viewer positions recorded.".yellow());
        return Ok(());
    }
    println!("{}", format!("{} viewer(s)", positions.len()).bold());
    for position in &positions {
        println!("  {}", line(position));
    }
    Ok(())
}

fn line(position: &ViewerPosition) -> String {
    let name = match (&position.meta.display_name, position.meta.anonymous) {
        (Some(name), false) => name.clone(),
        _ => "anonymous".to_string(),
    };
    format!(
        "{:<16} {:<12} {}",
        position.viewer.to_string(),
        name,
        position.head.to_string().cyan()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::head::Head;
    use crate::store::ViewerMeta;

    #[test]
    fn test_line_hides_anonymous_names() {
        colored::control::set_override(false);
        let position = ViewerPosition {
            viewer: "A_7".into(),
            head: Head::at("s1", "main"),
            meta: ViewerMeta {
                display_name: Some("Ada".into()),
                anonymous: true,
            },
        };
        let text = line(&position);
        assert!(text.contains("anonymous"));
        assert!(!text.contains("Ada"));
        assert!(text.ends_with("s1@main"));
    }
}
