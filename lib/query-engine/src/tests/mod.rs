mod generator;
mod testkit;
