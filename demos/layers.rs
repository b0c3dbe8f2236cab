//! Draws a small layered scene and saves the flattened result as PNG
#![deny(warnings)]

use framepaint::*;
use std::{env, fs::File, io::BufReader};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    output_file: String,
    width: usize,
    height: usize,
    stroke: usize,
    fg: RGBA,
    bg: RGBA,
    filters: Vec<Filter>,
    font: Option<(String, String)>,
    text: String,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut result = Args {
            output_file: String::new(),
            width: 320,
            height: 240,
            stroke: 3,
            fg: "#ffb000".parse()?,
            bg: "#202040".parse()?,
            filters: Vec::new(),
            font: None,
            text: "framepaint".to_owned(),
        };
        let mut positional = 0;
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "layers".to_owned());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" => {
                    positional = 0;
                    break;
                }
                "-w" => {
                    result.width = args.next().ok_or("-w requires argument")?.parse()?;
                }
                "-H" => {
                    result.height = args.next().ok_or("-H requires argument")?.parse()?;
                }
                "-s" => {
                    result.stroke = args.next().ok_or("-s requires argument")?.parse()?;
                }
                "-fg" => {
                    result.fg = args
                        .next()
                        .ok_or("-fg requires color #rrggbb(aa) argument")?
                        .parse()?;
                }
                "-bg" => {
                    result.bg = args
                        .next()
                        .ok_or("-bg requires color #rrggbb(aa) argument")?
                        .parse()?;
                }
                "-filter" => {
                    let name = args.next().ok_or("-filter requires argument")?;
                    result
                        .filters
                        .push(serde_json::from_value(serde_json::Value::String(name))?);
                }
                "-font" => {
                    let atlas = args.next().ok_or("-font requires atlas argument")?;
                    let metrics = args.next().ok_or("-font requires metrics argument")?;
                    result.font = Some((atlas, metrics));
                }
                "-text" => {
                    result.text = args.next().ok_or("-text requires argument")?;
                }
                _ => {
                    positional += 1;
                    match positional {
                        1 => result.output_file = arg,
                        _ => return Err("unexpected positional argument".into()),
                    }
                }
            }
        }
        if positional < 1 {
            eprintln!("Draws a small layered scene and saves the flattened result as PNG");
            eprintln!("\nUSAGE:");
            eprintln!(
                "    {} [-w <width>] [-H <height>] [-s <stroke>] [-fg <color>] [-bg <color>] [-filter <name>]... [-font <atlas.png> <metrics.json>] [-text <text>] <out.png>",
                cmd
            );
            eprintln!("\nARGS:");
            eprintln!("    -w <width>         width of the output image (default: 320)");
            eprintln!("    -H <height>        height of the output image (default: 240)");
            eprintln!("    -s <stroke>        stroke width of shapes (default: 3)");
            eprintln!("    -fg <color>        foreground color");
            eprintln!("    -bg <color>        background color");
            eprintln!(
                "    -filter <name>     filter applied to the shapes layer (e.g. blur, flip_x)"
            );
            eprintln!("    -font <png> <json> bitmap font atlas and its metrics");
            eprintln!("    -text <text>       text drawn with the font");
            eprintln!("    <out.png>          flattened image in the PNG format");
            std::process::exit(1);
        }
        Ok(result)
    }
}

fn shapes(args: &Args) -> Result<Layer, Error> {
    let mut layer = Layer::new(args.width, args.height, PixelFormat::Rgba8888);
    let style = DrawStyle::new(args.fg, args.fg.with_alpha(255)).with_stroke_width(args.stroke);
    let (w, h) = (args.width as i32, args.height as i32);

    draw_line(&mut layer, &style, 10, 10, w - 10, h / 2)?;
    draw_line_aa(&mut layer, &style, 10, h - 10, w - 10, h / 3)?;
    draw_circle(&mut layer, &style, w / 2, h / 2, h.min(w) / 4)?;

    let mut rect = style;
    rect.set_foreground(args.fg.with_alpha(96));
    draw_rectangle(&mut layer, &rect, w / 8, h / 8, args.width / 4, args.height / 4)?;

    let mut big = style.with_stroke_width(1);
    big.set_zoom(4);
    draw_big_line(&mut layer, &big, 2, (h - 12) / 4, (w - 8) / 4, (h - 4) / 4)?;

    for filter in args.filters.iter() {
        apply_filter(&mut layer, *filter)?;
    }
    Ok(layer)
}

fn text(args: &Args, atlas: &str, metrics: &str) -> Result<Layer, Error> {
    let atlas = read_png(atlas)?;
    let font = Font::load_metrics_json(atlas, BufReader::new(File::open(metrics)?))?;
    let mut layer = Layer::new(args.width, args.height / 4, PixelFormat::Rgba8888);
    let style = DrawStyle::new(RGBA::WHITE, RGBA::TRANSPARENT);
    let flags = TextFlags {
        blend: true,
        ..TextFlags::default()
    };
    draw_text(&mut layer, &style, &font, &args.text, 4, 4, flags)?;
    layer.set_position(0, (args.height - args.height / 4) as i32);
    layer.set_opacity(0.8);
    Ok(layer)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;

    let mut background = Layer::new(args.width, args.height, PixelFormat::Rgb888);
    paint_layer(&mut background, args.bg)?;
    let mut layers = vec![background, shapes(&args)?];
    if let Some((atlas, metrics)) = &args.font {
        layers.push(text(&args, atlas, metrics)?);
    }

    save_png(&args.output_file, &layers, args.width, args.height, 0, 0)?;
    tracing::debug!("[saved] {}", args.output_file);
    Ok(())
}
