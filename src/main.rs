//! # Crossdoc CLI
//!
//! Usage:
//!   crossdoc input.json -o pages.json
//!   echo '{ ... }' | crossdoc --max-pages 20 > pages.json
//!   crossdoc input.json --styles styles.json --levels 2 --threshold 0.5
//!   crossdoc --example > report.json
//!
//! Reads a builder document, flows it, splits its single page into pages,
//! and writes the positioned document as JSON. Set `RUST_LOG=debug` to see
//! every page break.

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::process;

use log::info;

use crossdoc::builder::DocBuilder;
use crossdoc::paginate::Paginator;
use crossdoc::style::Styler;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {e}");
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut input_path = None;
    let mut output_path = None;
    let mut styles_path = None;
    let mut paginator = Paginator::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .ok_or_else(|| format!("{arg} needs a value"))
        };
        match arg.as_str() {
            "-o" => output_path = Some(value()?.clone()),
            "--styles" => styles_path = Some(value()?.clone()),
            "--levels" => paginator.num_levels = value()?.parse()?,
            "--max-pages" => paginator.max_pages = value()?.parse()?,
            "--threshold" => paginator.width_threshold = value()?.parse()?,
            flag if flag.starts_with('-') => return Err(format!("unknown option {flag}").into()),
            path => input_path = Some(path.to_string()),
        }
    }

    let input = match &input_path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut builder = DocBuilder::from_json(&input)?;
    if let Some(path) = &styles_path {
        let styler = Styler::from_json(&fs::read_to_string(path)?)?;
        builder.apply_styles(&styler);
    }
    let mut doc = builder.to_doc()?;
    paginator.run(&mut doc)?;
    info!("{} pages", doc.pages.len());

    let json = doc.to_json()?;
    match &output_path {
        Some(path) => {
            fs::write(path, &json)?;
            eprintln!("✓ Written {} pages to {}", doc.pages.len(), path);
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn example_report_json() -> &'static str {
    r##"{
  "page_size": "letter",
  "page_orientation": "portrait",
  "page_margin": "0.75in",
  "header": {
    "tag": "HEADER",
    "children": [
      { "tag": "FOOTER_LEFT", "text": "Quarterly Report",
        "font": { "size": 10, "weight": "bold" } },
      { "tag": "FOOTER_RIGHT", "text": "Acme Corp",
        "font": { "size": 10, "align": "right" } }
    ]
  },
  "footer": {
    "tag": "FOOTER",
    "children": [
      { "tag": "FOOTER_CENTER", "min_height": 24 }
    ]
  },
  "pages": [
    {
      "tag": "PAGE",
      "children": [
        { "tag": "H1", "text": "Quarterly Report",
          "font": { "size": 32 }, "margin": { "bottom": 8 } },
        { "tag": "P",
          "text": "Revenue grew in every region this quarter. The tables below break the numbers down by product line and by month, followed by the list of open action items carried over from the last review.",
          "font": { "size": 12 }, "margin": { "bottom": 12 } },
        {
          "tag": "DIV",
          "block_orientation": "horizontal",
          "margin": { "bottom": 12 },
          "children": [
            { "tag": "DIV", "weight": 2, "min_height": 180,
              "background": { "color": "#EEF2F7" } },
            { "tag": "DIV", "weight": 1, "min_height": 180,
              "src": "https://example.com/chart.png" }
          ]
        },
        {
          "tag": "OL",
          "margin": { "bottom": 12, "left": 20 },
          "children": [
            { "tag": "LI", "children": [ { "tag": "P", "text": "Renew the warehouse lease before the end of the fiscal year.", "font": { "size": 12, "line_height": 24 } } ] },
            { "tag": "LI", "children": [ { "tag": "P", "text": "Hire two additional support engineers for the EMEA region.", "font": { "size": 12, "line_height": 24 } } ] },
            { "tag": "LI", "children": [ { "tag": "P", "text": "Migrate billing to the new payments provider.", "font": { "size": 12, "line_height": 24 } } ] },
            { "tag": "LI", "children": [ { "tag": "P", "text": "Publish the updated pricing sheet.", "font": { "size": 12, "line_height": 24 } } ] },
            { "tag": "LI", "children": [ { "tag": "P", "text": "Close out the remaining audit findings.", "font": { "size": 12, "line_height": 24 } } ] }
          ]
        },
        {
          "tag": "TABLE",
          "border": { "top": { "width": 1 }, "right": { "width": 1 }, "bottom": { "width": 1 }, "left": { "width": 1 } },
          "children": [
            { "tag": "TR", "block_orientation": "horizontal", "children": [
              { "tag": "TD", "text": "Product", "font": { "size": 9, "align": "center" }, "margin": { "top": 1, "right": 8, "bottom": 1, "left": 8 } },
              { "tag": "TD", "text": "Units", "font": { "size": 9, "align": "center" }, "margin": { "top": 1, "right": 8, "bottom": 1, "left": 8 } },
              { "tag": "TD", "text": "Revenue", "font": { "size": 9, "align": "center" }, "margin": { "top": 1, "right": 8, "bottom": 1, "left": 8 } }
            ] },
            { "tag": "TR", "block_orientation": "horizontal", "min_height": 400, "children": [
              { "tag": "TD", "text": "Widgets", "font": { "size": 9 } },
              { "tag": "TD", "text": "12,400", "font": { "size": 9 } },
              { "tag": "TD", "text": "$1.2M", "font": { "size": 9 } }
            ] }
          ]
        }
      ]
    }
  ]
}
"##
}
