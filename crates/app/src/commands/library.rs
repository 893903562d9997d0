use anyhow::Result;
use serene_core::catalog::{LibraryFilter, Technique};
use services::AppServices;

fn notation(technique: &Technique) -> Result<String> {
    Ok(technique.pattern(None)?.notation())
}

pub fn list(app: &AppServices, filter: &LibraryFilter) -> Result<()> {
    let techniques = app.library().list(filter);
    if techniques.is_empty() {
        println!("No techniques match those filters.");
        return Ok(());
    }

    for technique in &techniques {
        println!(
            "{:<26} {:<28} {:<13} {:<16} {}",
            technique.id,
            technique.name,
            technique.difficulty.as_str(),
            notation(technique)?,
            technique.duration_label
        );
    }
    if filter.is_active() {
        println!("\n{} of {} techniques", techniques.len(), app.library().catalog().all().len());
    }
    Ok(())
}

pub fn categories(app: &AppServices) -> Result<()> {
    for (category, count) in app.library().categories() {
        println!("{:<13} {count:>2}", category.as_str());
    }
    Ok(())
}

pub fn show(app: &AppServices, id: &str) -> Result<()> {
    let technique = app.library().technique(id)?;
    let categories = technique
        .categories
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    println!("{} ({})", technique.name, technique.id);
    println!("{}\n", technique.description);
    println!("Pattern:    {} seconds", notation(technique)?);
    println!("Cycles:     {}", technique.default_cycles());
    println!("Duration:   {}", technique.duration_label);
    println!("Difficulty: {}", technique.difficulty);
    println!("Categories: {categories}");
    if !technique.customizable {
        println!("Timings are fixed for this technique.");
    }

    println!("\nBenefits:");
    for benefit in technique.benefits {
        println!("  - {benefit}");
    }
    if !technique.warnings.is_empty() {
        println!("\nCautions:");
        for warning in technique.warnings {
            println!("  ! {warning}");
        }
    }
    Ok(())
}
