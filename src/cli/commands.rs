use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "asset-chain")]
pub struct Opt {
    #[arg(long = "config", global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,
    #[arg(
        long = "difficulty",
        global = true,
        help = "Leading zero bytes required in every mined block hash"
    )]
    pub difficulty: Option<u32>,
    #[arg(long = "data-dir", global = true, help = "Directory holding chain and state")]
    pub data_dir: Option<PathBuf>,
    #[arg(
        long = "timeout-secs",
        global = true,
        help = "Give up mining a block after this many seconds"
    )]
    pub timeout_secs: Option<u64>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    #[command(
        name = "demo",
        about = "Build an in-memory chain with two blocks and print it"
    )]
    Demo,
    #[command(name = "append", about = "Mine a payload onto the stored chain")]
    Append {
        #[arg(help = "Data to record in the new block")]
        payload: String,
    },
    #[command(name = "printchain", about = "Print all blocks in the stored chain")]
    Printchain,
    #[command(name = "validate", about = "Verify every link and proof in the stored chain")]
    Validate,
    #[command(name = "create-product", about = "Register a newly manufactured product")]
    CreateProduct {
        #[arg(help = "Unique product id")]
        id: String,
        #[arg(help = "Product description")]
        description: String,
    },
    #[command(name = "read-product", about = "Show a product record")]
    ReadProduct {
        #[arg(help = "Product id")]
        id: String,
    },
    #[command(name = "transfer-product", about = "Change a product's owner and status")]
    TransferProduct {
        #[arg(help = "Product id")]
        id: String,
        #[arg(help = "New owner")]
        owner: String,
        #[arg(help = "New status, e.g. Shipped")]
        status: String,
    },
    #[command(name = "product-exists", about = "Check whether a product id is taken")]
    ProductExists {
        #[arg(help = "Product id")]
        id: String,
    },
    #[command(name = "seed", about = "Write the sample product records")]
    Seed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transfer_with_global_flags() {
        let opt = Opt::try_parse_from([
            "asset-chain",
            "transfer-product",
            "p1",
            "Retailer",
            "Shipped",
            "--difficulty",
            "1",
        ])
        .unwrap();

        assert_eq!(opt.difficulty, Some(1));
        assert_eq!(
            opt.command,
            Command::TransferProduct {
                id: "p1".to_string(),
                owner: "Retailer".to_string(),
                status: "Shipped".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_argument_rejected() {
        assert!(Opt::try_parse_from(["asset-chain", "create-product", "p1"]).is_err());
    }
}
