// Recurrent forecasting model, trained from scratch for every request
mod adam;
mod dense;
mod dropout;
mod early_stopping;
mod lstm;
mod model;
mod network;
mod tensor;

pub use {
    adam::Adam,
    early_stopping::{EarlyStopping, EpochVerdict},
    model::{Evaluation, ForecastModel, ModelState, TrainingReport},
    network::StackedLstm,
};
