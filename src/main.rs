use anyhow::Result;
use clap::{Parser, Subcommand};
use grit::areas::repository::Repository;
use grit::artifacts::objects::object_type::ObjectType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "grit",
    version = "0.1.0",
    about = "A minimal content-addressable object store",
    long_about = "A minimal implementation of git's loose-object repository \
    format: typed, hash-identified objects, reference resolution, tree \
    checkout and a staging-snapshot reader."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "cat-file", about = "Print the payload of an object")]
    CatFile {
        #[arg(index = 1, help = "The expected object type")]
        r#type: String,
        #[arg(index = 2, help = "The object to print")]
        object: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally store it as an object"
    )]
    HashObject {
        #[arg(short = 't', long = "type", default_value = "blob", help = "The object type")]
        r#type: String,
        #[arg(short, long, help = "Store the object instead of only hashing it")]
        write: bool,
        #[arg(index = 1, help = "The file to hash")]
        file: PathBuf,
    },
    #[command(name = "log", about = "Show the commit history")]
    Log {
        #[arg(index = 1, default_value = "HEAD", help = "The commit to start from")]
        commit: String,
    },
    #[command(name = "ls-tree", about = "List the entries of a tree")]
    LsTree {
        #[arg(short, long, help = "Recurse into subtrees")]
        recursive: bool,
        #[arg(index = 1, help = "The tree to list (a commit is dereferenced)")]
        tree: String,
    },
    #[command(name = "checkout", about = "Materialize a tree into an empty directory")]
    Checkout {
        #[arg(index = 1, help = "The commit or tree to materialize")]
        commit: String,
        #[arg(index = 2, help = "The destination directory")]
        path: PathBuf,
    },
    #[command(name = "show-ref", about = "List all references")]
    ShowRef,
    #[command(name = "tag", about = "List tags or create one")]
    Tag {
        #[arg(short, long, help = "Create an annotated tag object")]
        annotated: bool,
        #[arg(short, long, help = "The tag message (annotated tags)")]
        message: Option<String>,
        #[arg(index = 1, help = "The tag name; omit to list tags")]
        name: Option<String>,
        #[arg(index = 2, default_value = "HEAD", help = "The object the tag points at")]
        object: String,
    },
    #[command(name = "rev-parse", about = "Resolve a name to an object id")]
    RevParse {
        #[arg(long, help = "Peel until an object of this type is reached")]
        kind: Option<String>,
        #[arg(index = 1, help = "The name to resolve")]
        name: String,
    },
    #[command(name = "cat-index", about = "Print the staging snapshot entries")]
    CatIndex,
    #[command(name = "status", about = "Compare the staging snapshot to the working tree")]
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let pwd = std::env::current_dir()?;
    let repository = Repository::discover(&pwd, Box::new(std::io::stdout()))?;

    match &cli.command {
        Commands::CatFile { r#type, object } => {
            repository.cat_file(ObjectType::try_from(r#type.as_str())?, object)?
        }
        Commands::HashObject {
            r#type,
            write,
            file,
        } => repository.hash_object(file, ObjectType::try_from(r#type.as_str())?, *write)?,
        Commands::Log { commit } => repository.log(commit)?,
        Commands::LsTree { recursive, tree } => repository.ls_tree(tree, *recursive)?,
        Commands::Checkout { commit, path } => repository.checkout(commit, path)?,
        Commands::ShowRef => repository.show_ref()?,
        Commands::Tag {
            annotated,
            message,
            name,
            object,
        } => repository.tag(name.as_deref(), object, *annotated, message.as_deref())?,
        Commands::RevParse { kind, name } => {
            let kind = kind
                .as_deref()
                .map(ObjectType::try_from)
                .transpose()?;
            repository.rev_parse(name, kind)?
        }
        Commands::CatIndex => repository.cat_index()?,
        Commands::Status => repository.status()?,
    }

    Ok(())
}
