use crate::models::{ChartInterval, ChartKind, ChartRange, StockQuery};
use crate::utils::errors::QueryError;

/// Parse a chat command of the form
/// `<prefix> <ticker> <range> <interval> <type> [moving averages...]`
///
/// e.g. `&stock AAPL 1y 1d candle 2 3 5` is a daily candlestick chart of AAPL
/// for the last year with 2, 3 and 5 day moving averages.
pub fn parse_query(input: &str, prefix: &str) -> Result<StockQuery, QueryError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();

    match tokens.first() {
        Some(&first) if first == prefix => parse_args(&tokens[1..], prefix),
        _ => Err(QueryError::Usage {
            prefix: prefix.to_string(),
        }),
    }
}

/// Parse the arguments that follow the command prefix
///
/// `usage_prefix` only appears in the usage message.
pub fn parse_args(args: &[&str], usage_prefix: &str) -> Result<StockQuery, QueryError> {
    if args.len() < 4 {
        return Err(QueryError::Usage {
            prefix: usage_prefix.to_string(),
        });
    }

    let ticker = args[0].trim().to_uppercase();
    let range: ChartRange = args[1].parse()?;
    let interval: ChartInterval = args[2].parse()?;
    let kind: ChartKind = args[3].parse()?;

    let moving_averages = args[4..]
        .iter()
        .map(|value| match value.parse::<usize>() {
            Ok(window) if window > 0 => Ok(window),
            _ => Err(QueryError::InvalidMovingAverage(value.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StockQuery {
        ticker,
        range,
        interval,
        kind,
        moving_averages,
    })
}
