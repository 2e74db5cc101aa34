/*!
# Expense Tracker

A browser-based expense tracker with a live, animated donut chart, built in Rust.

## Overview

Expenses are entered through a small form and written to a document store.
The chart never talks to the form: it subscribes to the store's "expenses"
collection, keeps a local mirror of it up to date, and redraws whenever a
batch of changes arrives. Clicking a slice asks the store to delete that
record; the slice disappears once the store reports the removal.

## Architecture

### Input
- **form**: field validation, cost parsing and submission to the store

### Store
- **store**: the `ExpenseStore` contract (subscribe, create, update, delete)
  and `MemoryStore`, an in-process implementation pushing change batches
- **saving**: gzip-compressed bincode snapshots of the in-process store

### Visualization
- **mirror**: ordered local copy of the collection, rebuilt from change batches
- **pie**: angular layout of the records, sized by cost, unsorted
- **arc**: donut sector geometry (SVG paths, polygons, hit testing)
- **color**: ordinal color scale over a 12 color categorical palette
- **transition**: eased enter, update and exit tweens plus fill fades
- **chart**: the animated chart itself, hover tooltips and click targets
- **visualization**: mirror and chart glued to a store subscription

### Web (feature `web`)
- **render**: chart frames rendered to SVG or PNG with plotters
- **app**: axum routes serving the page, the form endpoint and the chart

## REST API Endpoints

- `GET /api/expenses`, `POST /api/expenses` - List the mirror, submit the form
- `DELETE /api/expenses/{id}` - Delete a record
- `GET /api/chart`, `/api/chart.svg`, `/api/chart.png` - Current chart frame
- `POST /api/chart/hover`, `/api/chart/leave`, `/api/chart/click` - Pointer events
*/

pub mod arc;
pub mod chart;
pub mod color;
pub mod config;
pub mod error;
pub mod expense;
pub mod form;
pub mod mirror;
pub mod pie;
pub mod saving;
pub mod store;
pub mod transition;
pub mod visualization;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod render;

/// Re-export the types most callers need
pub use chart::{Frame, PieChart};
pub use config::{Config, Dimensions};
pub use error::{FormError, RenderError, StoreError, SubmitError};
pub use expense::{Change, ChangeBatch, ChangeKind, Expense, ExpenseId, NewExpense};
pub use form::ExpenseForm;
pub use mirror::{Applied, ExpenseMirror, Mismatch};
pub use store::{ExpenseStore, MemoryStore, Subscription};
pub use visualization::{Clock, Visualization};
