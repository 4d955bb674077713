//! Fill a bucket covering the whole id space with random nodes, then keep
//! splitting the half that holds the most nodes, the way a routing table
//! would around its own id.

use clap::Parser;
use kbucket::{KBucket, KBucketConfig, Node, U256};
use tracing::{info, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Maximum number of live nodes per bucket
    #[arg(short, default_value_t = 8)]
    k: usize,
    /// Replacement cache size, as a multiple of k
    #[arg(short, long, default_value_t = 5)]
    replacement_factor: usize,
    /// Number of random nodes to insert
    #[arg(short, long, default_value_t = 100)]
    nodes: usize,
    /// How many times to split
    #[arg(short, long, default_value_t = 4)]
    splits: usize,
    /// Log every bucket operation
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::TRACE } else { Level::INFO })
        .init();

    let config = KBucketConfig::default()
        .with_k(cli.k)
        .with_replacement_factor(cli.replacement_factor);

    let mut bucket = KBucket::new(U256::zero(), (U256::one() << 160) - 1, config);

    let nodes: Vec<Node> = (0..cli.nodes).map(|_| Node::random()).collect();
    let admitted = nodes.iter().filter(|n| bucket.add_node((*n).clone())).count();

    info!(
        admitted,
        staged = bucket.replacement_nodes().len(),
        depth = bucket.depth(),
        "Filled bucket"
    );

    for round in 1..=cli.splits {
        if !bucket.is_splittable() {
            info!(round, "Bucket covers a single id, stopping");
            break;
        }

        let (one, two) = bucket.split();

        info!(
            round,
            one = one.len() + one.replacement_nodes().len(),
            two = two.len() + two.replacement_nodes().len(),
            "Split"
        );

        bucket = if one.len() + one.replacement_nodes().len()
            >= two.len() + two.replacement_nodes().len()
        {
            one
        } else {
            two
        };
    }

    print!("{}", bucket);

    match bucket.head() {
        Ok(head) => println!("least recently seen: {}", head.id()),
        Err(error) => println!("{}", error),
    }
}
