//! Cart commands.

use food_explorer::cart::AddOutcome;
use food_explorer::catalog::CatalogSource;
use food_explorer::error::{AppError, add_breadcrumb};
use food_explorer::state::AppState;

use super::{parse_code, product_line};

/// Print the cart lines and the total.
pub fn list(state: &AppState) {
    let cart = state.cart();
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for item in cart.items() {
        println!("{:>4} x {}", item.count, product_line(&item.product));
    }
    println!("{} items", cart.total_item_count());
}

/// Look up `code` and add one of it.
pub async fn add(state: &AppState, code: &str) -> Result<(), AppError> {
    let code = parse_code(code)?;
    let product = state.catalog().get_by_barcode(&code).await?;
    let name = product.name.clone();

    let outcome = state.cart().add(product)?;
    add_breadcrumb("cart", "Added product", Some(&[("code", code.as_str())]));

    match outcome {
        AddOutcome::Added => println!("Added {name} to cart"),
        AddOutcome::Incremented { count } => {
            println!("Added another {name} to cart ({count} in cart)");
        }
    }

    Ok(())
}

/// Set the quantity of `code`.
pub fn set(state: &AppState, code: &str, count: i64) -> Result<(), AppError> {
    let code = parse_code(code)?;
    let cart = state.cart();

    if !cart.contains(&code) {
        return Err(AppError::InvalidInput(format!("{code} is not in the cart")));
    }

    cart.set_quantity(&code, count)?;
    match cart.get(&code) {
        Some(item) => println!("{} x {}", item.count, item.product_name()),
        None => println!("Removed {code} from cart"),
    }

    Ok(())
}

/// Remove `code`.
pub fn remove(state: &AppState, code: &str) -> Result<(), AppError> {
    let code = parse_code(code)?;

    if state.cart().remove(&code)? {
        println!("Removed {code} from cart");
    } else {
        println!("{code} was not in the cart");
    }

    Ok(())
}

/// Empty the cart.
pub fn clear(state: &AppState) -> Result<(), AppError> {
    state.cart().clear()?;
    println!("Cart cleared");
    Ok(())
}

/// Print the total item count.
pub fn count(state: &AppState) {
    println!("{}", state.cart().total_item_count());
}
