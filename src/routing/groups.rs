//! Feature groups and the suppression list.
//!
//! # Responsibilities
//! - Hold the static group → route-name fragment table
//! - Exempt groups whose feature the installation allows
//! - Flatten the remaining groups into a suppression list
//!
//! # Design Decisions
//! - The table and the exemptions are data; adding a group or an exemption
//!   does not touch control flow
//! - A group may be exempted by several independent predicates; any one is
//!   enough
//! - Output order follows the table, duplicates are dropped

use std::fmt;

use serde::{Deserialize, Serialize};

/// Feature switches consulted when building the suppression list.
pub trait FeaturePolicy: Send + Sync {
    fn are_customers_allowed(&self) -> bool;
    fn are_zones_allowed(&self) -> bool;
    fn are_countries_allowed(&self) -> bool;
}

/// A named cluster of routes toggled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    Customer,
    Product,
    Taxon,
    Checkout,
    Address,
    Order,
    Adjustment,
    Promotion,
    Shipment,
    Inventory,
    Attribute,
    Payment,
    Paypal,
    Tax,
    Currency,
    Exchange,
    Zone,
    Country,
    Province,
    Cart,
    Dashboard,
    Other,
}

impl FeatureGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureGroup::Customer => "customer",
            FeatureGroup::Product => "product",
            FeatureGroup::Taxon => "taxon",
            FeatureGroup::Checkout => "checkout",
            FeatureGroup::Address => "address",
            FeatureGroup::Order => "order",
            FeatureGroup::Adjustment => "adjustment",
            FeatureGroup::Promotion => "promotion",
            FeatureGroup::Shipment => "shipment",
            FeatureGroup::Inventory => "inventory",
            FeatureGroup::Attribute => "attribute",
            FeatureGroup::Payment => "payment",
            FeatureGroup::Paypal => "paypal",
            FeatureGroup::Tax => "tax",
            FeatureGroup::Currency => "currency",
            FeatureGroup::Exchange => "exchange",
            FeatureGroup::Zone => "zone",
            FeatureGroup::Country => "country",
            FeatureGroup::Province => "province",
            FeatureGroup::Cart => "cart",
            FeatureGroup::Dashboard => "dashboard",
            FeatureGroup::Other => "other",
        }
    }

    /// Route-name fragments belonging to this group.
    pub fn prefixes(&self) -> &'static [&'static str] {
        ROUTE_GROUPS
            .iter()
            .find(|(group, _)| group == self)
            .map(|(_, prefixes)| *prefixes)
            .unwrap_or(&[])
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static group table, in evaluation order.
pub const ROUTE_GROUPS: &[(FeatureGroup, &[&str])] = &[
    (
        FeatureGroup::Customer,
        &[
            "sylius_admin_partial_customer",
            "sylius_admin_customer",
            "api_customer",
            "sylius_shop_log",
            "sylius_shop_register",
            "sylius_shop_request_password_reset_token",
            "sylius_shop_password_reset",
            "sylius_shop_user_request_verification_token",
            "sylius_shop_user_verification",
            "sylius_shop_account",
            "api_register_shop_users_post_collection",
            "sylius_api_shop_authentication_token",
            "sylius_shop_ajax_user_check_action",
        ],
    ),
    (
        FeatureGroup::Product,
        &[
            "sylius_admin_product",
            "sylius_admin_api_product",
            "sylius_admin_ajax_product",
            "sylius_shop_partial_product",
            "sylius_shop_product",
            "sylius_admin_partial_product",
            "sylius_admin_ajax_generate_product_slug",
            "api_product",
        ],
    ),
    (
        FeatureGroup::Taxon,
        &[
            "sylius_admin_partial_taxon",
            "sylius_admin_ajax_taxon",
            "sylius_admin_taxon",
            "sylius_admin_api_taxon",
            "sylius_shop_partial_taxon",
            "sylius_admin_ajax_generate_taxon_slug",
            "sylius_shop_partial_channel_menu_taxon_index",
            "api_taxon",
        ],
    ),
    (
        FeatureGroup::Checkout,
        &[
            "sylius_admin_api_checkout",
            "sylius_shop_checkout",
            "sylius_shop_register_after_checkout",
        ],
    ),
    (
        FeatureGroup::Address,
        &["sylius_shop_account_address", "sylius_admin_partial_address"],
    ),
    (
        FeatureGroup::Order,
        &[
            "sylius_admin_order",
            "sylius_admin_api_order",
            "sylius_shop_account_order",
            "sylius_shop_order",
            "sylius_admin_partial_order",
            "sylius_admin_customer_order",
            "sylius_admin_api_customer_order",
            "api_order",
        ],
    ),
    (
        FeatureGroup::Adjustment,
        &[
            "sylius_admin_api_adjustment",
            "sylius_shop_ajax_render_province_form",
            "api_adjustment",
        ],
    ),
    (
        FeatureGroup::Promotion,
        &[
            "sylius_admin_partial_promotion",
            "sylius_admin_promotion",
            "sylius_admin_api_promotion",
            "api_promo",
        ],
    ),
    (
        FeatureGroup::Shipment,
        &[
            "sylius_admin_partial_shipment",
            "sylius_admin_ship",
            "sylius_admin_api_ship",
            "api_ship",
        ],
    ),
    (FeatureGroup::Inventory, &["sylius_admin_inventory"]),
    (
        FeatureGroup::Attribute,
        &[
            "sylius_admin_get_attribute_types",
            "sylius_admin_get_product_attributes",
            "sylius_admin_render_attribute_forms",
        ],
    ),
    (
        FeatureGroup::Payment,
        &[
            "sylius_admin_payment",
            "sylius_admin_get_payment",
            "payum_",
            "sylius_admin_api_payment",
            "api_pay",
        ],
    ),
    (FeatureGroup::Paypal, &["sylius_paypal"]),
    (
        FeatureGroup::Tax,
        &["sylius_admin_tax_", "sylius_admin_api_tax_", "api_tax"],
    ),
    (
        FeatureGroup::Currency,
        &[
            "sylius_admin_currency",
            "sylius_admin_api_currency",
            "sylius_shop_switch_currency",
            "api_currencies",
        ],
    ),
    (
        FeatureGroup::Exchange,
        &[
            "sylius_admin_exchange",
            "sylius_admin_api_exchange",
            "api_exchange",
        ],
    ),
    (
        FeatureGroup::Zone,
        &["sylius_admin_zone", "sylius_admin_api_zone", "api_zone"],
    ),
    (
        FeatureGroup::Country,
        &[
            "sylius_admin_country",
            "sylius_admin_api_country",
            "api_countries",
        ],
    ),
    (
        FeatureGroup::Province,
        &[
            "sylius_admin_api_province",
            "sylius_admin_ajax_render_province_form",
            "api_province",
        ],
    ),
    (
        FeatureGroup::Cart,
        &[
            "sylius_admin_api_cart",
            "sylius_shop_ajax_cart",
            "sylius_shop_partial_cart",
            "sylius_shop_cart",
            "api_cart",
        ],
    ),
    (
        FeatureGroup::Dashboard,
        &["sylius_admin_dashboard_statistics"],
    ),
    (
        FeatureGroup::Other,
        &["api_shop_billing", "api_channels_shop"],
    ),
];

/// A group is left out of the suppression list when its predicate holds.
pub struct GroupExemption {
    pub group: FeatureGroup,
    pub applies: fn(&dyn FeaturePolicy) -> bool,
}

fn customers_allowed(policy: &dyn FeaturePolicy) -> bool {
    policy.are_customers_allowed()
}

fn zones_allowed(policy: &dyn FeaturePolicy) -> bool {
    policy.are_zones_allowed()
}

fn countries_allowed(policy: &dyn FeaturePolicy) -> bool {
    policy.are_countries_allowed()
}

pub const EXEMPTIONS: &[GroupExemption] = &[
    GroupExemption {
        group: FeatureGroup::Customer,
        applies: customers_allowed,
    },
    GroupExemption {
        group: FeatureGroup::Zone,
        applies: zones_allowed,
    },
    // Countries come with zones.
    GroupExemption {
        group: FeatureGroup::Country,
        applies: zones_allowed,
    },
    GroupExemption {
        group: FeatureGroup::Country,
        applies: countries_allowed,
    },
];

/// Groups left active (suppressed) under the given policy, in table order.
pub fn suppressed_groups(policy: &dyn FeaturePolicy) -> Vec<FeatureGroup> {
    ROUTE_GROUPS
        .iter()
        .map(|(group, _)| *group)
        .filter(|group| {
            !EXEMPTIONS
                .iter()
                .any(|exemption| exemption.group == *group && (exemption.applies)(policy))
        })
        .collect()
}

/// Flattened set of route-name fragments to suppress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SuppressionList {
    fragments: Vec<String>,
}

impl SuppressionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment. Duplicates are ignored.
    pub fn insert(&mut self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        if !self.fragments.contains(&fragment) {
            self.fragments.push(fragment);
        }
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.fragments.iter().any(|f| f == fragment)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// First fragment found anywhere inside `route_name`.
    ///
    /// Matching is a case-sensitive substring search, not a prefix check.
    /// Short fragments can hit unrelated names (e.g. a custom route
    /// containing `api_order`); that is a known sharp edge.
    pub fn find_match(&self, route_name: &str) -> Option<&str> {
        self.iter().find(|fragment| route_name.contains(fragment))
    }
}

impl<S: Into<String>> FromIterator<S> for SuppressionList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = SuppressionList::new();
        for fragment in iter {
            list.insert(fragment);
        }
        list
    }
}

/// Compute the suppression list for a policy.
pub fn compute_active_suppression_list(policy: &dyn FeaturePolicy) -> SuppressionList {
    suppressed_groups(policy)
        .iter()
        .flat_map(|group| group.prefixes().iter().copied())
        .collect()
}
