//! Arrow schema of the tick table and record batch encoding

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::shared::errors::AnalysisError;
use crate::shared::types::TickRow;

pub const BOTTLENECK_LEG: &str = "bottleneckLeg";
pub const UNREALISED_PNL: &str = "unrealisedPnl";
pub const TRADED_NOTIONAL: &str = "tradedNotional";
pub const ORDER_BOOK_LEVELS: &str = "orderBookLevels";
pub const TICK_PROCESS_TIME: &str = "tickProcessTime";
pub const TICK_RECEIVE_TIME: &str = "tickReceiveTime";
pub const RATE1: &str = "rate1";
pub const RATE2: &str = "rate2";
pub const RATE3: &str = "rate3";
pub const IS_ARBITRAGE_OPPORTUNITY: &str = "isArbitrageOpportunity";

pub fn tick_schema() -> Schema {
    Schema::new(vec![
        Field::new(BOTTLENECK_LEG, DataType::Utf8, false),
        Field::new(UNREALISED_PNL, DataType::Float64, false),
        Field::new(TRADED_NOTIONAL, DataType::Float64, false),
        Field::new(ORDER_BOOK_LEVELS, DataType::Utf8, false),
        Field::new(TICK_PROCESS_TIME, DataType::Int64, false),
        Field::new(TICK_RECEIVE_TIME, DataType::Int64, false),
        Field::new(RATE1, DataType::Float64, false),
        Field::new(RATE2, DataType::Float64, false),
        Field::new(RATE3, DataType::Float64, false),
        Field::new(IS_ARBITRAGE_OPPORTUNITY, DataType::Boolean, false),
    ])
}

pub fn tick_batch(rows: &[TickRow]) -> Result<RecordBatch, AnalysisError> {
    let schema: SchemaRef = Arc::new(tick_schema());
    let bottleneck_leg = Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.bottleneck_leg.as_str()),
    )) as ArrayRef;
    let unrealised_pnl = Arc::new(Float64Array::from_iter_values(
        rows.iter().map(|r| r.unrealised_pnl),
    )) as ArrayRef;
    let traded_notional = Arc::new(Float64Array::from_iter_values(
        rows.iter().map(|r| r.traded_notional),
    )) as ArrayRef;
    let order_book_levels = Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.order_book_levels.as_str()),
    )) as ArrayRef;
    let tick_process_time = Arc::new(Int64Array::from_iter_values(
        rows.iter().map(|r| r.tick_process_time),
    )) as ArrayRef;
    let tick_receive_time = Arc::new(Int64Array::from_iter_values(
        rows.iter().map(|r| r.tick_receive_time),
    )) as ArrayRef;
    let rate1 = Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.rate1))) as ArrayRef;
    let rate2 = Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.rate2))) as ArrayRef;
    let rate3 = Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.rate3))) as ArrayRef;
    let is_arbitrage_opportunity = Arc::new(BooleanArray::from(
        rows.iter()
            .map(|r| r.is_arbitrage_opportunity)
            .collect::<Vec<_>>(),
    )) as ArrayRef;

    let arrays = vec![
        bottleneck_leg,
        unrealised_pnl,
        traded_notional,
        order_book_levels,
        tick_process_time,
        tick_receive_time,
        rate1,
        rate2,
        rate3,
        is_arbitrage_opportunity,
    ];
    RecordBatch::try_new(schema, arrays).map_err(AnalysisError::from)
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T, AnalysisError> {
    let array = batch
        .column_by_name(name)
        .ok_or_else(|| AnalysisError::InvalidColumn(format!("missing column {}", name)))?;
    if array.null_count() > 0 {
        return Err(AnalysisError::InvalidColumn(format!(
            "column {} has {} null value(s)",
            name,
            array.null_count()
        )));
    }
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        AnalysisError::InvalidColumn(format!(
            "column {} has type {}, expected {}",
            name,
            array.data_type(),
            std::any::type_name::<T>()
        ))
    })
}

/// Decode a batch produced by [`tick_batch`] (or any file with the same columns)
pub fn decode_tick_batch(batch: &RecordBatch) -> Result<Vec<TickRow>, AnalysisError> {
    let bottleneck_leg = column::<StringArray>(batch, BOTTLENECK_LEG)?;
    let unrealised_pnl = column::<Float64Array>(batch, UNREALISED_PNL)?;
    let traded_notional = column::<Float64Array>(batch, TRADED_NOTIONAL)?;
    let order_book_levels = column::<StringArray>(batch, ORDER_BOOK_LEVELS)?;
    let tick_process_time = column::<Int64Array>(batch, TICK_PROCESS_TIME)?;
    let tick_receive_time = column::<Int64Array>(batch, TICK_RECEIVE_TIME)?;
    let rate1 = column::<Float64Array>(batch, RATE1)?;
    let rate2 = column::<Float64Array>(batch, RATE2)?;
    let rate3 = column::<Float64Array>(batch, RATE3)?;
    let is_arbitrage_opportunity = column::<BooleanArray>(batch, IS_ARBITRAGE_OPPORTUNITY)?;

    Ok((0..batch.num_rows())
        .map(|i| TickRow {
            bottleneck_leg: bottleneck_leg.value(i).to_string(),
            unrealised_pnl: unrealised_pnl.value(i),
            traded_notional: traded_notional.value(i),
            order_book_levels: order_book_levels.value(i).to_string(),
            tick_process_time: tick_process_time.value(i),
            tick_receive_time: tick_receive_time.value(i),
            rate1: rate1.value(i),
            rate2: rate2.value(i),
            rate3: rate3.value(i),
            is_arbitrage_opportunity: is_arbitrage_opportunity.value(i),
        })
        .collect())
}
