//! Sample data for development stores

use crate::core::error::StoreError;
use crate::core::model::{NewAddress, NewCustomer};
use crate::core::query::CustomerQuery;
use crate::core::service::CustomerStore;

struct SampleCustomer {
    first_name: &'static str,
    last_name: &'static str,
    phone_number: &'static str,
    /// (details, city, state, pin)
    addresses: &'static [(&'static str, &'static str, &'static str, &'static str)],
}

const SAMPLE_CUSTOMERS: &[SampleCustomer] = &[
    SampleCustomer {
        first_name: "John",
        last_name: "Doe",
        phone_number: "+91 98765 43210",
        addresses: &[("123 Main Street, Andheri West", "Mumbai", "Maharashtra", "400058")],
    },
    SampleCustomer {
        first_name: "Jane",
        last_name: "Smith",
        phone_number: "+91 87654 32109",
        addresses: &[
            ("456 Park Avenue, Connaught Place", "Delhi", "Delhi", "110001"),
            ("789 Shopping Complex, Karol Bagh", "Delhi", "Delhi", "110005"),
        ],
    },
    SampleCustomer {
        first_name: "Raj",
        last_name: "Patel",
        phone_number: "+91 76543 21098",
        addresses: &[("321 Tech Hub, Electronic City", "Bangalore", "Karnataka", "560100")],
    },
    SampleCustomer {
        first_name: "Priya",
        last_name: "Sharma",
        phone_number: "+91 65432 10987",
        addresses: &[
            ("654 Residency Road, T Nagar", "Chennai", "Tamil Nadu", "600017"),
            ("987 Beach Road, Marina", "Chennai", "Tamil Nadu", "600013"),
            ("147 IT Park, Velachery", "Chennai", "Tamil Nadu", "600042"),
        ],
    },
    SampleCustomer {
        first_name: "Michael",
        last_name: "Johnson",
        phone_number: "+91 54321 09876",
        addresses: &[("258 Business District, Bandra", "Mumbai", "Maharashtra", "400050")],
    },
];

/// Load five customers and eight addresses into an empty store
///
/// Does nothing if the store already holds a customer. Returns the number of
/// customers created.
pub async fn seed_sample_data(store: &dyn CustomerStore) -> Result<usize, StoreError> {
    let existing = store.list_customers(&CustomerQuery::new().with_limit(1)).await?;
    if existing.total > 0 {
        tracing::debug!(customers = existing.total, "store not empty, skipping sample data");
        return Ok(0);
    }

    let mut addresses = 0;
    for sample in SAMPLE_CUSTOMERS {
        let customer = store
            .create_customer(NewCustomer::new(
                sample.first_name,
                sample.last_name,
                sample.phone_number,
            ))
            .await?;

        for &(details, city, state, pin_code) in sample.addresses {
            store
                .create_address(NewAddress::new(customer.id, details, city, state, pin_code))
                .await?;
            addresses += 1;
        }
    }

    tracing::info!(
        customers = SAMPLE_CUSTOMERS.len(),
        addresses,
        "loaded sample data"
    );
    Ok(SAMPLE_CUSTOMERS.len())
}
