//! Command-line interface for xsd-classgen

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use xsd_classgen::{
    DefinitionRenderer, DefinitionSet, Document, Instance, InstanceRenderer, ObjectGraph, Schema,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsd-classgen")]
#[command(author, version, about = "Generate class definitions and objects from XML Schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the classes generated for a schema
    Classes {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the top-level element tags and the classes they map to
    Tags {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,
    },

    /// Build objects from an instance document and validate them
    Objects {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Path to the XML instance document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Classes { schema, json } => cmd_classes(schema, json),
        Commands::Tags { schema } => cmd_tags(schema),
        Commands::Objects { schema, file, json } => cmd_objects(schema, file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn definitions(schema: &mut Schema) -> DefinitionSet {
    schema
        .render_classes(&DefinitionRenderer::default())
        .into_iter()
        .collect()
}

#[cfg(feature = "cli")]
fn cmd_classes(schema_path: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut schema = Schema::from_file(&schema_path)?;
    let definitions = definitions(&mut schema);

    if json_output {
        let all: Vec<_> = definitions.iter().collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    for (i, definition) in definitions.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", definition);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_tags(schema_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut schema = Schema::from_file(&schema_path)?;
    let tags = schema.tags();
    let builders = schema.builders();

    for (tag, id) in &tags {
        let builder = builders.get(*id);
        let class = builder
            .klass_name
            .clone()
            .or_else(|| builder.builtin().map(|b| b.name().to_string()))
            .unwrap_or_else(|| "-".to_string());
        println!("{} => {}", tag, class);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_objects(
    schema_path: PathBuf,
    file_path: PathBuf,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut schema = Schema::from_file(&schema_path)?;
    let definitions = definitions(&mut schema);

    let doc = Document::from_file(&file_path)?;
    let mut objects = ObjectGraph::from_instance(&doc, &schema)?;
    let Some(root) = objects.build(&InstanceRenderer, &schema)? else {
        return Err("instance document produced no objects".into());
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(root.as_ref())?);
    } else {
        print_instance(&root, 0);
    }

    let failures = definitions.validate(&root);
    if failures.is_empty() {
        eprintln!("✓ {} is valid", file_path.display());
        Ok(())
    } else {
        eprintln!("✗ {} is invalid", file_path.display());
        for failure in &failures {
            eprintln!("  - {}", failure);
        }
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn print_instance(instance: &Instance, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{}{}: {}", indent, instance.tag_name, instance.class_name);
    for (name, value) in &instance.attributes {
        line.push_str(&format!(" @{}={:?}", name, value));
    }
    if let Some(content) = &instance.content {
        line.push_str(&format!(" = {:?}", content));
    }
    println!("{}", line);

    for values in instance.fields.values() {
        for value in values {
            print_instance(value, depth + 1);
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
