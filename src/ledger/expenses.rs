use crate::error::{AppError, Result};
use crate::model::{Expense, ExpenseChanges, NewExpense};
use crate::store::{from_row, from_rows, tables, to_row, Query, RecordStore};

use super::single;

pub fn list_expenses(store: &dyn RecordStore) -> Result<Vec<Expense>> {
    let rows = store.select(&Query::table(tables::EXPENSES).order("created_at", false))?;
    from_rows(rows)
}

pub fn get_expense(store: &dyn RecordStore, id: &str) -> Result<Expense> {
    let rows = store.select(&Query::table(tables::EXPENSES).eq("id", id))?;
    single(rows, AppError::ExpenseNotFound(id.to_string()))
}

pub fn add_expense(store: &dyn RecordStore, expense: &NewExpense) -> Result<Expense> {
    if expense.nominal < 0 {
        return Err(AppError::NegativeAmount);
    }
    let row = store.insert(tables::EXPENSES, to_row(expense)?)?;
    tracing::info!(category = %expense.category, amount = expense.nominal, "expense added");
    from_row(row)
}

pub fn update_expense(
    store: &dyn RecordStore,
    id: &str,
    changes: &ExpenseChanges,
) -> Result<Expense> {
    if changes.nominal.is_some_and(|n| n < 0) {
        return Err(AppError::NegativeAmount);
    }
    if changes.is_empty() {
        return get_expense(store, id);
    }

    let rows = store.update(
        &Query::table(tables::EXPENSES).eq("id", id),
        to_row(changes)?,
    )?;
    single(rows, AppError::ExpenseNotFound(id.to_string()))
}

pub fn delete_expense(store: &dyn RecordStore, id: &str) -> Result<()> {
    get_expense(store, id)?;
    store.delete(&Query::table(tables::EXPENSES).eq("id", id))?;
    Ok(())
}
