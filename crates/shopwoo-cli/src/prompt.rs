//! Interactive mode selection when neither a subcommand nor
//! `SHOPIFY_BASE_URL` is given.

use std::io::{BufRead, Write};

use shopwoo_core::AppConfig;

use crate::import::{handles_from, Plan};

/// Asks for the import mode, the store URL and (for a targeted import) the
/// product links. Invalid answers are asked again.
///
/// # Errors
///
/// Fails when input ends before every question is answered or the terminal
/// cannot be written.
pub(crate) fn ask_plan<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    config: &AppConfig,
) -> anyhow::Result<Plan> {
    writeln!(output, "Import mode:")?;
    writeln!(output, "  1) full catalog")?;
    writeln!(output, "  2) specific products")?;

    let targeted = ask_until(input, output, "Choose 1 or 2: ", |answer| match answer {
        "1" => Some(false),
        "2" => Some(true),
        _ => None,
    })?;
    let shop_url = ask_until(input, output, "Shopify store URL: ", |answer| {
        (!answer.is_empty()).then(|| answer.to_owned())
    })?;

    if !targeted {
        return Ok(Plan::full_crawl(shop_url, config));
    }

    let handles = ask_until(
        input,
        output,
        "Product URLs or handles (comma-separated): ",
        |answer| {
            let handles = handles_from(&[answer.to_owned()]);
            (!handles.is_empty()).then_some(handles)
        },
    )?;
    Ok(Plan::Targeted { shop_url, handles })
}

fn ask_until<R, W, T>(
    input: &mut R,
    output: &mut W,
    question: &str,
    accept: impl Fn(&str) -> Option<T>,
) -> anyhow::Result<T>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "{question}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            anyhow::bail!("input closed before an answer was given");
        }
        if let Some(value) = accept(line.trim()) {
            return Ok(value);
        }
    }
}
