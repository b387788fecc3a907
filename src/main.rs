// Copyright 2019 Eric Izoita (nytopop)
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies
// of the Software, and to permit persons to whom the Software is furnished to
// do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use num_bigint::BigUint;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mediant::cf::{self, DECIMAL_DIGITS};
use mediant::config::DEFAULT_MAX_CF_DEPTH;
use mediant::{Enumeration, Error, Fraction, NodeId, RlePath, Variant};

#[derive(Parser, Debug)]
#[command(name = "mediant", about = "Explore the Stern-Brocot and Calkin-Wilf trees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Describe a single node.
    Show {
        #[arg(long, value_enum, default_value_t = Tree::Sb)]
        variant: Tree,
        #[command(flatten)]
        target: Target,
        /// Depth at which nodes given by a continued fraction or a value are
        /// cut off.
        #[arg(long, default_value_t = DEFAULT_MAX_CF_DEPTH)]
        max_depth: u64,
    },
    /// Print the tree's fractions in breadth-first order.
    Enumerate {
        #[arg(long, value_enum, default_value_t = Tree::Sb)]
        variant: Tree,
        /// Number of fractions to print.
        #[arg(long, default_value_t = 15)]
        count: usize,
        /// Path of the first node printed.
        #[arg(long)]
        start: Option<RlePath>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Tree {
    /// Stern-Brocot
    #[value(alias = "stern-brocot")]
    Sb,
    /// Calkin-Wilf
    #[value(alias = "calkin-wilf")]
    Cw,
}

impl From<Tree> for Variant {
    fn from(tree: Tree) -> Self {
        match tree {
            Tree::Sb => Variant::SternBrocot,
            Tree::Cw => Variant::CalkinWilf,
        }
    }
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Target {
    /// Path from the root, e.g. `RL2R` (`I` for the root).
    #[arg(long)]
    path: Option<RlePath>,
    /// Continued fraction coefficients, e.g. `1,1,3`.
    #[arg(long, value_delimiter = ',')]
    cf: Option<Vec<BigUint>>,
    /// A positive fraction `p/q`.
    #[arg(long)]
    value: Option<Fraction>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            variant,
            target,
            max_depth,
        } => run_show(variant.into(), target, max_depth)?,
        Commands::Enumerate {
            variant,
            count,
            start,
        } => run_enumerate(variant.into(), count, start),
    }

    Ok(())
}

fn run_show(variant: Variant, target: Target, max_depth: u64) -> Result<()> {
    let node = match target {
        Target { path: Some(path), .. } => NodeId::from_path(path),
        Target { cf: Some(cf), .. } => {
            let node = NodeId::from_continued_fraction(variant, &cf, max_depth);
            uncapped(node)
                .with_context(|| format!("invalid continued fraction {}", cf_string(&cf)))?
        }
        Target { value: Some(value), .. } => {
            let node = NodeId::from_ratio(variant, &value, max_depth);
            uncapped(node).with_context(|| format!("cannot place {} in the tree", value))?
        }
        _ => bail!("one of --path, --cf or --value is required"),
    };

    let value = node.value(variant);
    println!("tree     {}", variant);
    println!("value    {}", value);
    println!("decimal  {}", cf::to_decimal(&value, DECIMAL_DIGITS));
    println!("depth    {}", node.depth());
    println!("index    {}", node.index());
    println!("path     {}", node);
    println!("cf       {}", cf_string(&node.to_continued_fraction(variant)));

    Ok(())
}

fn run_enumerate(variant: Variant, count: usize, start: Option<RlePath>) {
    let nodes = match start {
        Some(path) => Enumeration::starting_at(variant, NodeId::from_path(path)),
        None => Enumeration::new(variant),
    };

    for (node, value) in nodes.take(count) {
        println!("{}\t{}\t{}", node.bfs_index(), node, value);
    }
}

/// Accepts a node cut off at the depth cap, with a warning.
fn uncapped(node: mediant::Result<NodeId>) -> mediant::Result<NodeId> {
    match node {
        Err(Error::PrecisionCapped { cap, truncated }) => {
            warn!(cap, "node is deeper than the cap, showing its ancestor");
            Ok(*truncated)
        }
        other => other,
    }
}

/// Formats coefficients the usual way, `[a0; a1, a2, ...]`.
fn cf_string(coefficients: &[BigUint]) -> String {
    match coefficients.split_first() {
        Some((first, [])) => format!("[{}]", first),
        Some((first, rest)) => {
            let rest: Vec<String> = rest.iter().map(ToString::to_string).collect();
            format!("[{}; {}]", first, rest.join(", "))
        }
        None => "[]".to_string(),
    }
}
